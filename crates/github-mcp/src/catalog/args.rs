use super::ToolError;
use rmcp::model::JsonObject;
use serde_json::Value;
use unrelated_github_client::api::Page;

/// Typed access to `tools/call` arguments.
///
/// Integers are accepted as JSON numbers or numeric strings; `null` counts as absent.
pub(crate) struct Args<'a> {
    map: &'a JsonObject,
}

impl<'a> Args<'a> {
    pub(crate) fn new(map: &'a JsonObject) -> Self {
        Self { map }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub(crate) fn opt_str(&self, key: &str) -> Result<Option<&'a str>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(ToolError::Arguments(format!("'{key}' must be a string"))),
        }
    }

    /// Optional string with blank values treated as absent.
    pub(crate) fn non_empty_str(&self, key: &str) -> Result<Option<&'a str>, ToolError> {
        Ok(self.opt_str(key)?.map(str::trim).filter(|s| !s.is_empty()))
    }

    pub(crate) fn str_or(&self, key: &str, default: &'a str) -> Result<&'a str, ToolError> {
        Ok(self.non_empty_str(key)?.unwrap_or(default))
    }

    pub(crate) fn required_str(&self, key: &str) -> Result<&'a str, ToolError> {
        self.opt_str(key)?
            .ok_or_else(|| ToolError::Arguments(format!("missing required argument '{key}'")))
    }

    pub(crate) fn opt_u64(&self, key: &str) -> Result<Option<u64>, ToolError> {
        let invalid = || ToolError::Arguments(format!("'{key}' must be a non-negative integer"));
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(invalid),
            Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
            Some(_) => Err(invalid()),
        }
    }

    pub(crate) fn required_u64(&self, key: &str) -> Result<u64, ToolError> {
        self.opt_u64(key)?
            .ok_or_else(|| ToolError::Arguments(format!("missing required argument '{key}'")))
    }

    /// An identifier GitHub accepts either as a number or as a name, such as a workflow id or
    /// its file name `ci.yml`.
    pub(crate) fn required_id(&self, key: &str) -> Result<String, ToolError> {
        match self.get(key) {
            None => Err(ToolError::Arguments(format!("missing required argument '{key}'"))),
            Some(Value::Number(n)) if n.is_u64() => Ok(n.to_string()),
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Some(_) => Err(ToolError::Arguments(format!(
                "'{key}' must be a numeric id or a name"
            ))),
        }
    }

    /// A JSON object given inline or as a string holding JSON; blank strings count as absent.
    ///
    /// A string that is not a JSON object is refused as a readable result rather than a
    /// protocol error, since the schema cannot describe its contents.
    pub(crate) fn json_object(&self, key: &str) -> Result<Option<JsonObject>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map.clone())),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
                Ok(Value::Object(map)) => Ok(Some(map)),
                _ => Err(ToolError::Refused(format!(
                    "Invalid JSON in '{key}': expected an object"
                ))),
            },
            Some(_) => Err(ToolError::Arguments(format!(
                "'{key}' must be an object or a JSON string"
            ))),
        }
    }

    pub(crate) fn bool_or(&self, key: &str, default: bool) -> Result<bool, ToolError> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
            Some(_) => Err(ToolError::Arguments(format!("'{key}' must be a boolean"))),
        }
    }

    /// A list of strings given as a JSON array or a comma-separated string.
    pub(crate) fn string_list(&self, key: &str) -> Result<Vec<String>, ToolError> {
        let invalid = || ToolError::Arguments(format!("'{key}' must be a list of strings"));
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string).ok_or_else(invalid))
                .collect(),
            Some(_) => Err(invalid()),
        }
    }

    /// Like [`Self::string_list`], but `None` when the argument is absent so a patch can leave
    /// the field alone. An explicit empty list still clears it.
    pub(crate) fn opt_string_list(&self, key: &str) -> Result<Option<Vec<String>>, ToolError> {
        if self.get(key).is_none() {
            return Ok(None);
        }
        self.string_list(key).map(Some)
    }

    /// `per_page` (default 30, capped at 100) and `page` (default 1).
    pub(crate) fn page(&self) -> Result<Page, ToolError> {
        let per_page = self.opt_u64("per_page")?.unwrap_or(30);
        let page = self.opt_u64("page")?.unwrap_or(1);
        Ok(Page::new(
            u32::try_from(per_page).unwrap_or(u32::MAX),
            u32::try_from(page).unwrap_or(u32::MAX),
        ))
    }
}
