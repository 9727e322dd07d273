use crate::rank::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::path::PathBuf;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct InputSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// csv or xlsx
    pub provider: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "previewRows")]
    pub preview_rows: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RunRules {
    /// drop or reject
    #[serde(rename = "emptyTokens")]
    pub empty_tokens: Option<String>,
    /// zero or fail
    #[serde(rename = "degenerateRow")]
    pub degenerate_row: Option<String>,
}

impl RunRules {
    pub fn parse_options(&self) -> RankResult<ParseOptions> {
        let empty_tokens = match self.empty_tokens.as_deref() {
            None | Some("drop") => EmptyTokens::Drop,
            Some("reject") => EmptyTokens::Reject,
            Some(x) => whatever!("unknown emptyTokens rule: {}", x),
        };
        Ok(ParseOptions { empty_tokens })
    }

    pub fn engine_options(&self) -> RankResult<EngineOptions> {
        let degenerate_row = match self.degenerate_row.as_deref() {
            None | Some("zero") => DegenerateRow::Zero,
            Some("fail") => DegenerateRow::Fail,
            Some(x) => whatever!("unknown degenerateRow rule: {}", x),
        };
        Ok(EngineOptions {
            degenerate_row,
            ..EngineOptions::DEFAULT
        })
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub input: InputSource,
    /// Either a comma-separated string or a list
    #[serde(rename = "weights")]
    _weights: JSValue,
    /// Either a comma-separated string or a list
    #[serde(rename = "impacts")]
    _impacts: JSValue,
    pub output: Option<OutputSettings>,
    pub rules: Option<RunRules>,
}

impl RunConfig {
    pub fn weights(&self) -> RankResult<ListSpec> {
        read_js_list(&self._weights, "weights")
    }

    pub fn impacts(&self) -> RankResult<ListSpec> {
        read_js_list(&self._impacts, "impacts")
    }
}

/// Weights or impacts, as given by the user.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ListSpec {
    /// A comma-separated specification, such as `"1,1,2"`
    Joined(String),
    /// The entries of a list, such as `[1, 1, 2]`
    Items(Vec<String>),
}

impl ListSpec {
    pub fn as_input(&self) -> ListInput<'_> {
        match self {
            ListSpec::Joined(s) => ListInput::Joined(s),
            ListSpec::Items(items) => ListInput::Entries(items),
        }
    }
}

/// Reads a run configuration. The relative paths it contains are resolved against the
/// directory of the configuration file.
pub fn read_config(path: &str) -> RankResult<RunConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let mut config: RunConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    let root_p = Path::new(path).parent().unwrap_or_else(|| Path::new(""));
    config.input.file_path = resolve_path(root_p, &config.input.file_path);
    if let Some(o) = config.output.as_mut() {
        o.file_path = o.file_path.as_ref().map(|p| resolve_path(root_p, p));
    }
    Ok(config)
}

fn resolve_path(root: &Path, p: &str) -> String {
    if p == STDOUT_OUTPUT || Path::new(p).is_absolute() {
        return p.to_string();
    }
    let full: PathBuf = root.join(p);
    full.display().to_string()
}

// A list may be written "1,1,2" or [1, 1, 2].
fn read_js_list(x: &JSValue, field: &str) -> RankResult<ListSpec> {
    match x {
        JSValue::String(s) => Ok(ListSpec::Joined(s.clone())),
        JSValue::Array(elts) => {
            let mut tokens: Vec<String> = Vec::new();
            for elt in elts {
                match elt {
                    JSValue::String(s) => tokens.push(s.clone()),
                    JSValue::Number(n) => tokens.push(n.to_string()),
                    _ => whatever!("Cannot read {} entry {:?}", field, elt),
                }
            }
            Ok(ListSpec::Items(tokens))
        }
        _ => whatever!("Cannot read {} from {:?}", field, x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(xs: &[&str]) -> ListSpec {
        ListSpec::Items(xs.iter().map(|x| x.to_string()).collect())
    }

    fn lists() {
        assert_eq!(read_js_list(&json!("1,1,2"), "weights").unwrap(), "1,1,2");
        assert_eq!(
            read_js_list(&json!([1, 0.5, "2"]), "weights").unwrap(),
            "1,0.5,2"
        );
        assert_eq!(read_js_list(&json!(["+", "-"]), "impacts").unwrap(), "+,-");
        assert_eq!(read_js_list(&json!([3]), "weights").unwrap(), "3,");
        assert!(read_js_list(&json!({"a": 1}), "weights").is_err());
        assert!(read_js_list(&json!([true]), "weights").is_err());
    }

    #[test]
    fn rules() {
        let r = RunRules {
            empty_tokens: Some("reject".to_string()),
            degenerate_row: None,
        };
        assert_eq!(
            r.parse_options().unwrap().empty_tokens,
            EmptyTokens::Reject
        );
        assert_eq!(
            r.engine_options().unwrap().degenerate_row,
            DegenerateRow::Zero
        );
        let r = RunRules {
            empty_tokens: Some("keep".to_string()),
            degenerate_row: Some("fail".to_string()),
        };
        assert!(r.parse_options().is_err());
        assert_eq!(
            r.engine_options().unwrap().degenerate_row,
            DegenerateRow::Fail
        );
    }

    #[test]
    fn parse_config() {
        let js = r#"{
            "input": {"filePath": "data.csv"},
            "weights": [1, 1, 2],
            "impacts": "+,-,+",
            "output": {"filePath": "/tmp/out.csv", "previewRows": 4}
        }"#;
        let config: RunConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.weights().unwrap(), items(&["1", "1", "2"]));
        assert_eq!(
            config.impacts().unwrap(),
            ListSpec::Joined("+,-,+".to_string())
        );
        assert_eq!(config.input.provider, None);
        assert_eq!(config.output.unwrap().preview_rows, Some(4));
        assert_eq!(config.rules, None);
    }

    #[test]
    fn relative_paths() {
        let root = Path::new("/data/runs");
        assert_eq!(resolve_path(root, "in.csv"), "/data/runs/in.csv");
        assert_eq!(resolve_path(root, "/abs/in.csv"), "/abs/in.csv");
        assert_eq!(resolve_path(root, "stdout"), "stdout");
    }
}
