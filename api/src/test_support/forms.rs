//! An HTML-form model for functional tests, with submit-button selection.
//!
//! The reqwest stack has no notion of a form, so tests describe the page's
//! form here, pick which submit button was pressed, and let
//! [`TestApp::submit_form`](super::TestApp::submit_form) turn that into the
//! request a browser would have sent. Field declaration order is preserved,
//! because that is the order a browser serializes in.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    /// Target of the submission, as a server-relative path.
    pub action: String,
    /// HTTP method, lowercase as it appears in markup.
    pub method: String,
    /// Encoding of the submission body.
    pub enctype: String,
    /// Fields in declaration order.
    pub fields: Vec<FormField>,
}

pub const URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART: &str = "multipart/form-data";

impl Form {
    pub fn new(action: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            method: method.into(),
            enctype: URLENCODED.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.push(FormField {
            name: Some(name.into()),
            value,
        });
        self
    }

    pub fn unnamed_field(mut self, value: FieldValue) -> Self {
        self.fields.push(FormField { name: None, value });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: Option<String>,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A single-valued control; `None` means unset and is not submitted.
    Text(Option<String>),
    /// A control carrying several values, like a multi-select or a repeated
    /// input.
    Multi(Vec<String>),
    /// A file-upload control.
    File(FileUpload),
    /// A submit button; the value is what gets sent when it is pressed.
    Submit(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// One entry of a serialized form submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitValue {
    Text(String),
    File(FileUpload),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("can't specify both a submit value and an index")]
    IndexAndValue,
}

/// Collects the name/value pairs a submission of `form` would carry.
///
/// `submit_name` names the submit button that was pressed. When several
/// fields share that name, `index` picks one by position among them and
/// `submit_value` picks one by its value; giving both is an error, giving
/// neither selects the first. All other fields contribute their values:
/// unnamed fields and unset values are skipped, multi-valued fields expand
/// into one entry per value, and file fields pass through unchanged.
pub fn submit_fields(
    form: &Form,
    submit_name: Option<&str>,
    index: Option<usize>,
    submit_value: Option<&str>,
) -> Result<Vec<(String, SubmitValue)>, SubmitError> {
    if index.is_some() && submit_value.is_some() {
        return Err(SubmitError::IndexAndValue);
    }

    // If no particular button was selected, use the first one.
    let index = if index.is_none() && submit_value.is_none() {
        Some(0)
    } else {
        index
    };

    let mut submit = Vec::new();
    // This counts all fields with the submit name, not just submit buttons.
    let mut current_index = 0;
    for field in &form.fields {
        let Some(name) = field.name.as_deref() else {
            continue;
        };
        if submit_name == Some(name) {
            if let FieldValue::Submit(value) = &field.value {
                if index == Some(current_index) {
                    submit.push((name.to_string(), SubmitValue::Text(value.clone())));
                }
                if submit_value == Some(value.as_str()) {
                    submit.push((name.to_string(), SubmitValue::Text(value.clone())));
                }
            }
            current_index += 1;
            continue;
        }

        match &field.value {
            FieldValue::Text(Some(value)) => {
                submit.push((name.to_string(), SubmitValue::Text(value.clone())));
            }
            FieldValue::Text(None) => {}
            FieldValue::Multi(values) => {
                for value in values {
                    submit.push((name.to_string(), SubmitValue::Text(value.clone())));
                }
            }
            FieldValue::File(upload) => {
                submit.push((name.to_string(), SubmitValue::File(upload.clone())));
            }
            // A button that was not pressed sends nothing.
            FieldValue::Submit(_) => {}
        }
    }

    Ok(submit)
}
