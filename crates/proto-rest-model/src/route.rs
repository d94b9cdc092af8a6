//! Route derivation: effective path, path-variable bindings, query
//! parameters, and the body-field set for one service method.

use proto_rest_core::HttpMethod;

use crate::model::{Cardinality, Header, Message, Method, Service};

/// Error deriving a route. Carries enough context for the validator to
/// produce an actionable message.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouteError {
    /// A `{var}` segment has no matching input field.
    #[error(
        "path variable '{{{var}}}' does not match any field of {input}. \
         Add a field named '{var}' or fix the path template."
    )]
    UnresolvedPathVar {
        /// The variable name.
        var: String,
        /// The input message full name.
        input: String,
    },

    /// A `{var}` segment matched a field that cannot be a path variable.
    #[error(
        "path variable '{{{var}}}' must bind a singular scalar field \
         (string, integer, bool, float, double); '{var}' in {input} is not. \
         Repeated, map, message, and bytes fields cannot appear in a path."
    )]
    NonScalarPathVar {
        /// The variable name.
        var: String,
        /// The input message full name.
        input: String,
    },

    /// The same variable appears twice in one template.
    #[error("path variable '{{{var}}}' appears more than once in '{path}'")]
    DuplicatePathVar {
        /// The variable name.
        var: String,
        /// The offending template.
        path: String,
    },

    /// A field is bound both as a path variable and a query parameter.
    #[error(
        "field '{field}' is bound twice: it is a path variable and a query \
         parameter. Remove the 'query' option or drop it from the path."
    )]
    DoubleBinding {
        /// The twice-bound field name.
        field: String,
    },

    /// GET/DELETE methods must not carry body fields.
    #[error(
        "{verb} requests carry no body, but fields [{fields}] of {input} are \
         neither path variables nor query parameters. Annotate them with \
         'query', move them into the path, or change the verb to POST/PUT/PATCH."
    )]
    BodyOnBodylessVerb {
        /// The verb (GET or DELETE).
        verb: &'static str,
        /// Comma-separated unbound field names.
        fields: String,
        /// The input message full name.
        input: String,
    },
}

/// One `{var}` binding: template position order, bound input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathVar {
    /// Variable name as written in the template.
    pub var: String,
    /// Index of the bound field in the input message.
    pub field: usize,
}

/// One query-parameter binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    /// Wire parameter name.
    pub name: String,
    /// Index of the bound field in the input message.
    pub field: usize,
    /// Reject requests that omit the parameter.
    pub required: bool,
}

/// The HTTP surface of one method: verb, effective path, and the disjoint
/// field bindings.
#[derive(Debug, Clone)]
pub struct Route {
    /// HTTP verb.
    pub verb: HttpMethod,
    /// Effective path: base path joined with the method path, normalized to
    /// a single leading slash and no duplicate slashes.
    pub path: String,
    /// Path-variable bindings in template order.
    pub path_vars: Vec<PathVar>,
    /// Query-parameter bindings in field declaration order.
    pub query_params: Vec<QueryParam>,
    /// Indices of input fields bound to the body, in declaration order.
    pub body_fields: Vec<usize>,
    /// Merged headers: service first, method overrides by name, sorted by
    /// name so emitted validation order is stable.
    pub headers: Vec<Header>,
}

impl Route {
    /// Derive the route for `method` of `service` against its input message.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when a path variable does not resolve to a
    /// singular scalar input field, a field is bound twice, or a GET/DELETE
    /// method is left with body fields.
    pub fn derive(service: &Service, method: &Method, input: &Message) -> Result<Self, RouteError> {
        let verb = effective_verb(method.verb);
        let path = join_paths(&service.base_path, &method.path);

        let mut path_vars = Vec::new();
        for var in template_vars(&path) {
            if path_vars.iter().any(|pv: &PathVar| pv.var == var) {
                return Err(RouteError::DuplicatePathVar {
                    var,
                    path: path.clone(),
                });
            }
            let Some(field) = input.fields.iter().position(|f| f.name == var) else {
                return Err(RouteError::UnresolvedPathVar {
                    var,
                    input: input.fqn.clone(),
                });
            };
            let f = &input.fields[field];
            let singular = matches!(f.cardinality, Cardinality::Singular | Cardinality::Optional);
            if !singular || !f.kind.is_path_scalar() {
                return Err(RouteError::NonScalarPathVar {
                    var,
                    input: input.fqn.clone(),
                });
            }
            path_vars.push(PathVar { var, field });
        }

        let mut query_params = Vec::new();
        for (i, f) in input.fields.iter().enumerate() {
            let Some(binding) = &f.query else { continue };
            if path_vars.iter().any(|pv| pv.field == i) {
                return Err(RouteError::DoubleBinding {
                    field: f.name.clone(),
                });
            }
            query_params.push(QueryParam {
                name: f.query_name().to_string(),
                field: i,
                required: binding.required,
            });
        }

        let body_fields: Vec<usize> = (0..input.fields.len())
            .filter(|i| {
                !path_vars.iter().any(|pv| pv.field == *i)
                    && !query_params.iter().any(|qp| qp.field == *i)
            })
            .collect();

        if !verb.has_body() && !body_fields.is_empty() {
            let names: Vec<&str> = body_fields
                .iter()
                .map(|&i| input.fields[i].name.as_str())
                .collect();
            return Err(RouteError::BodyOnBodylessVerb {
                verb: verb.as_verb(),
                fields: names.join(", "),
                input: input.fqn.clone(),
            });
        }

        Ok(Self {
            verb,
            path,
            path_vars,
            query_params,
            body_fields,
            headers: merge_headers(&service.headers, &method.headers),
        })
    }

    /// Whether requests on this route carry a body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.verb.has_body()
    }
}

/// `Unspecified` lowers to POST everywhere downstream.
fn effective_verb(verb: HttpMethod) -> HttpMethod {
    if verb == HttpMethod::Unspecified {
        HttpMethod::Post
    } else {
        verb
    }
}

/// Normalize a path fragment: single leading slash, no duplicate slashes, no
/// trailing slash (except the bare root).
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    out.push('/');
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(segment);
    }
    out
}

/// Join a base path and a method path, normalizing both. Empty + empty
/// yields `/`.
fn join_paths(base: &str, method: &str) -> String {
    let base = normalize_path(base);
    let method = normalize_path(method);
    if method == "/" {
        return base;
    }
    if base == "/" {
        return method;
    }
    format!("{base}{method}")
}

/// Extract `{var}` names from a template in order of appearance.
fn template_vars(path: &str) -> Vec<String> {
    let mut vars = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        vars.push(rest[start + 1..start + end].to_string());
        rest = &rest[start + end + 1..];
    }
    vars
}

/// Merge service and method headers: service first, then method entries
/// override by name. Empty-name entries are dropped. The result is sorted by
/// name so emitted validation order is stable across runs.
#[must_use]
pub fn merge_headers(service: &[Header], method: &[Header]) -> Vec<Header> {
    let mut merged: Vec<Header> = Vec::new();
    for header in service.iter().chain(method.iter()) {
        if header.name.is_empty() {
            continue;
        }
        if let Some(existing) = merged.iter_mut().find(|h| h.name == header.name) {
            *existing = header.clone();
        } else {
            merged.push(header.clone());
        }
    }
    merged.sort_by(|a, b| a.name.cmp(&b.name));
    merged
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{
        EncodingPolicy, Field, FieldKind, HeaderType, Message, Method, QueryBinding, Service,
    };

    fn field(name: &str, kind: FieldKind) -> Field {
        Field {
            name: name.to_string(),
            json_name: name.to_string(),
            number: 1,
            kind,
            cardinality: Cardinality::Singular,
            oneof_index: None,
            encoding: EncodingPolicy::default(),
            query: None,
            examples: vec![],
            rules: None,
            doc: String::new(),
        }
    }

    fn message(fqn: &str, fields: Vec<Field>) -> Message {
        Message {
            fqn: fqn.to_string(),
            local_name: fqn.rsplit('.').next().unwrap().to_string(),
            file: "test.proto".to_string(),
            package: "test.v1".to_string(),
            fields,
            oneofs: vec![],
            doc: String::new(),
        }
    }

    fn service(base_path: &str) -> Service {
        Service {
            name: "UserService".to_string(),
            base_path: base_path.to_string(),
            methods: vec![],
            headers: vec![],
            doc: String::new(),
        }
    }

    fn method(verb: HttpMethod, path: &str, input: &str) -> Method {
        Method {
            name: "GetUser".to_string(),
            verb,
            path: path.to_string(),
            input: input.to_string(),
            output: ".test.v1.User".to_string(),
            headers: vec![],
            doc: String::new(),
        }
    }

    fn header(name: &str, required: bool) -> Header {
        Header {
            name: name.to_string(),
            description: String::new(),
            ty: HeaderType::String,
            format: None,
            required,
            example: None,
            deprecated: false,
        }
    }

    #[test]
    fn normalize_rules() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("api/v1"), "/api/v1");
        assert_eq!(normalize_path("//api///v1/"), "/api/v1");
    }

    #[test]
    fn empty_base_and_root_method_path_produce_root() {
        let svc = service("");
        let mut input = message("test.v1.Req", vec![]);
        input.fields.clear();
        let route = Route::derive(&svc, &method(HttpMethod::Get, "/", ".test.v1.Req"), &input).unwrap();
        assert_eq!(route.path, "/");

        let route = Route::derive(&svc, &method(HttpMethod::Get, "", ".test.v1.Req"), &input).unwrap();
        assert_eq!(route.path, "/");
    }

    #[test]
    fn base_path_is_prefixed() {
        let svc = service("/api/v1");
        let input = message(
            "test.v1.GetUserRequest",
            vec![field("id", FieldKind::String)],
        );
        let route = Route::derive(
            &svc,
            &method(HttpMethod::Get, "/users/{id}", ".test.v1.GetUserRequest"),
            &input,
        )
        .unwrap();
        assert_eq!(route.path, "/api/v1/users/{id}");
        assert_eq!(route.path_vars.len(), 1);
        assert_eq!(route.path_vars[0].var, "id");
        assert_eq!(route.path_vars[0].field, 0);
    }

    #[test]
    fn unspecified_verb_defaults_to_post() {
        let svc = service("");
        let input = message("test.v1.Req", vec![field("name", FieldKind::String)]);
        let route = Route::derive(
            &svc,
            &method(HttpMethod::Unspecified, "/items", ".test.v1.Req"),
            &input,
        )
        .unwrap();
        assert_eq!(route.verb, HttpMethod::Post);
        assert_eq!(route.body_fields, vec![0]);
    }

    #[test]
    fn get_with_query_and_path_var_splits_bindings() {
        let svc = service("/api/v1");
        let mut input = message(
            "test.v1.GetUserRequest",
            vec![field("id", FieldKind::String), field("page", FieldKind::Int32)],
        );
        input.fields[1].query = Some(QueryBinding::default());
        let route = Route::derive(
            &svc,
            &method(HttpMethod::Get, "/users/{id}", ".test.v1.GetUserRequest"),
            &input,
        )
        .unwrap();
        assert_eq!(route.path_vars.len(), 1);
        assert_eq!(route.query_params.len(), 1);
        assert_eq!(route.query_params[0].name, "page");
        assert!(route.body_fields.is_empty());
    }

    #[test]
    fn query_name_override_is_used() {
        let svc = service("");
        let mut input = message("test.v1.Req", vec![field("page_size", FieldKind::Int32)]);
        input.fields[0].query = Some(QueryBinding {
            name: "pageSize".to_string(),
            required: true,
        });
        let route = Route::derive(
            &svc,
            &method(HttpMethod::Get, "/items", ".test.v1.Req"),
            &input,
        )
        .unwrap();
        assert_eq!(route.query_params[0].name, "pageSize");
        assert!(route.query_params[0].required);
    }

    #[test]
    fn unresolved_path_var_errors() {
        let svc = service("");
        let input = message("test.v1.Req", vec![field("id", FieldKind::String)]);
        let err = Route::derive(
            &svc,
            &method(HttpMethod::Get, "/items/{missing}", ".test.v1.Req"),
            &input,
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::UnresolvedPathVar { .. }));
        assert!(err.to_string().contains("{missing}"));
    }

    #[test]
    fn message_path_var_errors() {
        let svc = service("");
        let input = message(
            "test.v1.Req",
            vec![field("user", FieldKind::Message(".test.v1.User".to_string()))],
        );
        let err = Route::derive(
            &svc,
            &method(HttpMethod::Get, "/items/{user}", ".test.v1.Req"),
            &input,
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::NonScalarPathVar { .. }));
        assert!(err.to_string().contains("singular scalar"));
    }

    #[test]
    fn repeated_path_var_errors() {
        let svc = service("");
        let mut input = message("test.v1.Req", vec![field("ids", FieldKind::String)]);
        input.fields[0].cardinality = Cardinality::Repeated;
        let err = Route::derive(
            &svc,
            &method(HttpMethod::Get, "/items/{ids}", ".test.v1.Req"),
            &input,
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::NonScalarPathVar { .. }));
    }

    #[test]
    fn duplicate_path_var_errors() {
        let svc = service("");
        let input = message("test.v1.Req", vec![field("id", FieldKind::String)]);
        let err = Route::derive(
            &svc,
            &method(HttpMethod::Get, "/items/{id}/sub/{id}", ".test.v1.Req"),
            &input,
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::DuplicatePathVar { .. }));
    }

    #[test]
    fn path_var_with_query_option_is_double_binding() {
        let svc = service("");
        let mut input = message("test.v1.Req", vec![field("id", FieldKind::String)]);
        input.fields[0].query = Some(QueryBinding::default());
        let err = Route::derive(
            &svc,
            &method(HttpMethod::Get, "/items/{id}", ".test.v1.Req"),
            &input,
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::DoubleBinding { .. }));
    }

    #[test]
    fn get_with_unbound_fields_errors_with_remediation() {
        let svc = service("");
        let input = message(
            "test.v1.Req",
            vec![field("id", FieldKind::String), field("name", FieldKind::String)],
        );
        let err = Route::derive(
            &svc,
            &method(HttpMethod::Get, "/items/{id}", ".test.v1.Req"),
            &input,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("GET"), "verb named: {msg}");
        assert!(msg.contains("name"), "field named: {msg}");
        assert!(msg.contains("query"), "remediation: {msg}");
    }

    #[test]
    fn post_collects_body_fields() {
        let svc = service("");
        let input = message(
            "test.v1.Req",
            vec![
                field("id", FieldKind::String),
                field("name", FieldKind::String),
                field("age", FieldKind::Int32),
            ],
        );
        let route = Route::derive(
            &svc,
            &method(HttpMethod::Post, "/items/{id}", ".test.v1.Req"),
            &input,
        )
        .unwrap();
        assert_eq!(route.body_fields, vec![1, 2]);
        assert!(route.has_body());
    }

    #[test]
    fn merged_headers_method_wins_and_sorted() {
        let service_headers = vec![header("X-Api-Key", true), header("X-Trace", false)];
        let mut override_key = header("X-Api-Key", false);
        override_key.description = "method-level".to_string();
        let method_headers = vec![override_key, header("X-B", false)];

        let merged = merge_headers(&service_headers, &method_headers);
        let names: Vec<&str> = merged.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["X-Api-Key", "X-B", "X-Trace"]);
        let api_key = merged.iter().find(|h| h.name == "X-Api-Key").unwrap();
        assert!(!api_key.required, "method-level entry should win");
        assert_eq!(api_key.description, "method-level");
    }

    #[test]
    fn merged_headers_drop_empty_names() {
        let merged = merge_headers(&[header("", true)], &[header("X-A", false), header("", false)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "X-A");
    }
}
