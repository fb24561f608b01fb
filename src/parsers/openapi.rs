// OpenAPI/Swagger parser for authprobe
// Uses serde_json (and serde_yaml for .yaml/.yml files) to list every declared operation

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Endpoint, Method, ParsedSpec};

pub struct OpenApiParser;

impl OpenApiParser {
    /// Read a spec file and list its operations against the resolved base URL.
    /// `base_url` overrides whatever the document declares.
    pub fn parse(&self, file_path: &Path, base_url: Option<&str>) -> Result<ParsedSpec> {
        let data = std::fs::read_to_string(file_path)?;
        let doc = if is_yaml(file_path) {
            serde_yaml::from_str::<Value>(&data)?
        } else {
            serde_json::from_str::<Value>(&data)?
        };
        self.parse_document(&doc, base_url)
    }

    pub fn parse_document(&self, doc: &Value, base_url: Option<&str>) -> Result<ParsedSpec> {
        let paths = doc
            .get("paths")
            .and_then(|p| p.as_object())
            .ok_or_else(|| Error::Spec("no paths found in spec".to_string()))?;

        let base_url = match base_url.filter(|b| !b.is_empty()) {
            Some(b) => b.to_string(),
            None => OpenApiParser::declared_base_url(doc)?,
        };
        let base = base_url.trim_end_matches('/');

        let mut endpoints = Vec::new();
        for (path, item) in paths {
            let Some(methods) = item.as_object() else {
                debug!("Skipping non-object path item {}", path);
                continue;
            };
            for key in methods.keys() {
                let Ok(method) = key.parse::<Method>() else {
                    continue;
                };
                endpoints.push(Endpoint::new(method, path.clone(), format!("{}{}", base, path)));
            }
        }

        Ok(ParsedSpec { base_url, endpoints })
    }

    // OpenAPI 3 servers[0] first, then Swagger 2 host/basePath
    fn declared_base_url(doc: &Value) -> Result<String> {
        if let Some(url) = doc
            .get("servers")
            .and_then(|s| s.as_array())
            .and_then(|arr| arr.first())
            .and_then(OpenApiParser::server_with_vars)
        {
            if url.starts_with("http://") || url.starts_with("https://") {
                return Ok(url);
            }
            return Err(Error::Spec(format!(
                "server URL '{}' is relative; pass --base-url",
                url
            )));
        }

        if let Some(host) = doc.get("host").and_then(|h| h.as_str()) {
            let scheme = doc
                .get("schemes")
                .and_then(|s| s.as_array())
                .and_then(|arr| arr.first())
                .and_then(|s| s.as_str())
                .unwrap_or("https");
            let base_path = doc.get("basePath").and_then(|b| b.as_str()).unwrap_or("");
            return Ok(format!("{}://{}{}", scheme, host, base_path));
        }

        Err(Error::Spec(
            "no base URL in spec; pass --base-url".to_string(),
        ))
    }

    // If server URL contains variables like {env}, replace with defaults when available
    fn server_with_vars(server: &Value) -> Option<String> {
        let url = server.get("url")?.as_str()?;
        let mut result = url.to_string();
        if let Some(vars) = server.get("variables").and_then(|v| v.as_object()) {
            for (k, v) in vars {
                if let Some(def) = v.get("default").and_then(|d| d.as_str()) {
                    result = result.replace(&format!("{{{}}}", k), def);
                }
            }
        }
        Some(result)
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}
