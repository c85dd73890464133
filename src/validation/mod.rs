pub mod rules;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::AppError;

/// One rejected field. Nested fields use `lessons[0].name` style paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Runs the derived validation rules and flattens the result.
pub fn check<T: Validate>(value: &T) -> Vec<FieldError> {
    match value.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => flatten(&errors),
    }
}

pub fn ensure_valid<T: Validate>(value: &T) -> Result<(), AppError> {
    into_result(check(value))
}

pub fn into_result(errors: Vec<FieldError>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub fn ensure_positive_id(id: i64) -> Result<(), AppError> {
    if id > 0 {
        Ok(())
    } else {
        Err(AppError::Validation(vec![FieldError::new(
            "id",
            "must be greater than 0",
        )]))
    }
}

pub fn flatten(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect("", errors, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value ({})", err.code));
                    out.push(FieldError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Inner {
        #[validate(length(min = 2, message = "too short"))]
        label: String,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(custom(function = "rules::not_blank"))]
        title: String,
        #[validate(nested)]
        items: Vec<Inner>,
    }

    #[test]
    fn flattens_nested_list_errors_with_indexed_paths() {
        let value = Outer {
            title: " ".to_string(),
            items: vec![
                Inner { label: "ok".to_string() },
                Inner { label: "x".to_string() },
            ],
        };

        let errors = check(&value);

        assert_eq!(
            errors,
            vec![
                FieldError::new("items[1].label", "too short"),
                FieldError::new("title", "must not be blank"),
            ]
        );
    }

    #[test]
    fn valid_values_produce_no_errors() {
        let value = Outer {
            title: "Title".to_string(),
            items: vec![Inner { label: "ok".to_string() }],
        };
        assert!(check(&value).is_empty());
        assert!(ensure_valid(&value).is_ok());
    }

    #[test]
    fn ids_must_be_positive() {
        assert!(ensure_positive_id(1).is_ok());
        assert!(matches!(ensure_positive_id(0), Err(AppError::Validation(_))));
        assert!(matches!(ensure_positive_id(-1), Err(AppError::Validation(_))));
    }
}
