//! String transformation utilities for naming specs, files and operations

use once_cell::sync::Lazy;
use regex::Regex;

static PATH_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}/]+)\}").expect("valid path parameter regex"));

/// Convert a string to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_is_lowercase = false;

    for ch in s.chars() {
        if ch.is_uppercase() {
            // Word boundary on a lower-to-upper transition
            if prev_is_lowercase {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
            prev_is_lowercase = false;
        } else if ch.is_alphanumeric() {
            result.push(ch);
            prev_is_lowercase = ch.is_lowercase() || ch.is_ascii_digit();
        } else if matches!(ch, '-' | '_' | ' ' | '.' | '/') {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            prev_is_lowercase = false;
        }
    }

    // Remove duplicate underscores and trim
    let mut final_result = String::new();
    let mut prev_underscore = false;
    for ch in result.chars() {
        if ch == '_' {
            if !prev_underscore && !final_result.is_empty() {
                final_result.push(ch);
            }
            prev_underscore = true;
        } else {
            final_result.push(ch);
            prev_underscore = false;
        }
    }

    final_result.trim_matches('_').to_string()
}

/// Convert a string to UpperCamelCase (PascalCase)
pub fn to_upper_camel_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Convert a string to lowerCamelCase
pub fn to_lower_camel_case(s: &str) -> String {
    let upper_camel = to_upper_camel_case(s);
    let mut chars = upper_camel.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Convert a string to kebab-case, used for generated file names
pub fn to_kebab_case(s: &str) -> String {
    to_snake_case(s).replace('_', "-")
}

/// Build an operation id from an HTTP method and a path template.
///
/// `GET /widgets/{id}` becomes `getWidgetsById`.
pub fn operation_id_from_path(method: &str, path: &str) -> String {
    let mut id = method.to_lowercase();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if let Some(param) = segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        {
            id.push_str("By");
            id.push_str(&to_upper_camel_case(param));
        } else {
            id.push_str(&to_upper_camel_case(segment));
        }
    }
    id
}

/// Names of the `{param}` placeholders in a path template, in order
pub fn path_template_params(path: &str) -> Vec<String> {
    PATH_PARAM_RE
        .captures_iter(path)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Sanitize a string to be safe for use as a filename across all operating systems
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_snake_case("FindPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_snake_case("find-pets-by-status"), "find_pets_by_status");
        assert_eq!(to_snake_case("find_pets_by_status"), "find_pets_by_status");
        assert_eq!(to_snake_case("HTTPResponse"), "httpresponse");
        assert_eq!(to_snake_case("get HTTP Response"), "get_http_response");
        assert_eq!(to_snake_case("widgets.getWidget"), "widgets_get_widget");
        assert_eq!(to_snake_case("getV2Widgets"), "get_v2_widgets");
    }

    #[test]
    fn test_to_upper_camel_case() {
        assert_eq!(
            to_upper_camel_case("find_pets_by_status"),
            "FindPetsByStatus"
        );
        assert_eq!(to_upper_camel_case("findPetsByStatus"), "FindPetsByStatus");
        assert_eq!(
            to_upper_camel_case("FIND_PETS_BY_STATUS"),
            "FindPetsByStatus"
        );
        assert_eq!(to_upper_camel_case("user-profiles"), "UserProfiles");
    }

    #[test]
    fn test_to_lower_camel_case() {
        assert_eq!(
            to_lower_camel_case("find_pets_by_status"),
            "findPetsByStatus"
        );
        assert_eq!(to_lower_camel_case("FindPetsByStatus"), "findPetsByStatus");
        assert_eq!(to_lower_camel_case(""), "");
    }

    #[test]
    fn test_to_kebab_case() {
        assert_eq!(to_kebab_case("widgets.getWidgetsById"), "widgets-get-widgets-by-id");
        assert_eq!(to_kebab_case("CreateOrder"), "create-order");
    }

    #[test]
    fn test_operation_id_from_path() {
        assert_eq!(operation_id_from_path("GET", "/widgets/{id}"), "getWidgetsById");
        assert_eq!(operation_id_from_path("post", "/user-profiles"), "postUserProfiles");
        assert_eq!(
            operation_id_from_path("delete", "/pets/{petId}/toys/{toy_id}"),
            "deletePetsByPetIdToysByToyId"
        );
        assert_eq!(operation_id_from_path("get", "/"), "get");
    }

    #[test]
    fn test_path_template_params() {
        assert_eq!(
            path_template_params("/pets/{petId}/toys/{toyId}"),
            vec!["petId".to_string(), "toyId".to_string()]
        );
        assert!(path_template_params("/pets").is_empty());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a/b c.ts"), "a_b_c.ts");
    }
}
