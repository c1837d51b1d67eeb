// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Blocking HTTP implementation of [`SwanLabApi`]
//!
//! Endpoints, relative to `<api_host>/api`:
//!
//! - `workspaces`: `GET /workspaces[?username=]`
//! - `workspace`: `GET /workspaces/{u}`
//! - `projects`: `GET /projects?detail=&path=&sort=&search=`
//! - `project`: `GET /project/{u}/{p}`
//! - `runs`: `GET /project/{u}/{p}/runs?<filters>`
//! - `run`: `GET /experiment/{u}/{p}/{id}`
//! - `metric_columns`: `GET /experiment/{u}/{p}/{id}/column?all=true`
//! - `metrics`: `GET /experiment/{u}/{p}/{id}/metrics?keys=..&x_axis=&sample=`
//!
//! The SwanLab service shares the first five routes. It resolves a run path
//! to its CUID first and keys column and metric requests by that CUID
//! (`GET /experiment/{cuid}/column?all=true`, then per-key series under
//! `/experiment/{cuid}/`); the column list comes back under `list`.
//! Porting to the CUID form means calling `run` first and substituting its
//! `cuid` field in the last two rows.

use super::{ProjectQuery, SwanLabApi};
use crate::config::SwanConfig;
use crate::error::{Result, SwanError};
use crate::normalize::{coerce_str, ObjectFamily, RemoteObject};
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::{Map, Value};
use url::Url;

/// Keys that may accompany a `data` envelope around a single object
const ENVELOPE_KEYS: [&str; 4] = ["data", "code", "message", "success"];

/// REST client for the SwanLab API
pub struct HttpApi {
    base: Url,
    client: Client,
    family: ObjectFamily,
}

impl HttpApi {
    /// Build a client from configuration; fails when no API key is available
    pub fn new(config: &SwanConfig) -> Result<Self> {
        Self::with_family(config, ObjectFamily::default())
    }

    /// Build a client whose payload items use the given encoding family
    pub fn with_family(config: &SwanConfig, family: ObjectFamily) -> Result<Self> {
        let key = config.require_api_key()?;
        let base = Url::parse(&config.api_base()).map_err(|e| {
            SwanError::Configuration(format!("Invalid API host '{}': {}", config.api_host, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(SwanError::Configuration(format!(
                "Invalid API host '{}'",
                config.api_host
            )));
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", key))
            .map_err(|_| SwanError::Configuration("API key contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .user_agent(concat!("swanlab-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { base, client, family })
    }

    pub fn family(&self) -> ObjectFamily {
        self.family
    }

    /// Absolute URL for path segments below the API base
    fn endpoint<'a, I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SwanError::Configuration("API base cannot hold a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, mut url: Url, query: &[(&str, String)]) -> Result<Value> {
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            debug!("GET {} -> {}", url, status);
            return Err(SwanError::Remote {
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason()),
            });
        }
        Ok(response.json::<Value>()?)
    }

    fn get_list(&self, url: Url, query: &[(&str, String)]) -> Result<Vec<RemoteObject>> {
        let items = unwrap_list(self.get(url, query)?)?;
        Ok(self.family.adapt_all(items))
    }

    fn get_one(&self, url: Url) -> Result<RemoteObject> {
        Ok(self.family.adapt(unwrap_single(self.get(url, &[])?)))
    }
}

impl SwanLabApi for HttpApi {
    fn workspaces(&self, username: Option<&str>) -> Result<Vec<RemoteObject>> {
        let query: Vec<(&str, String)> = username
            .map(|u| ("username", u.to_string()))
            .into_iter()
            .collect();
        self.get_list(self.endpoint(["workspaces"])?, &query)
    }

    fn workspace(&self, username: &str) -> Result<RemoteObject> {
        self.get_one(self.endpoint(["workspaces", username])?)
    }

    fn projects(&self, query: &ProjectQuery) -> Result<Vec<RemoteObject>> {
        let mut params = vec![("detail", query.detail.to_string())];
        if let Some(path) = &query.path {
            params.push(("path", path.clone()));
        }
        if let Some(sort) = &query.sort {
            params.push(("sort", sort.clone()));
        }
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        self.get_list(self.endpoint(["projects"])?, &params)
    }

    fn project(&self, path: &str) -> Result<RemoteObject> {
        self.get_one(self.endpoint(std::iter::once("project").chain(path.split('/')))?)
    }

    fn runs(
        &self,
        project_path: &str,
        filters: Option<&Map<String, Value>>,
    ) -> Result<Vec<RemoteObject>> {
        let url = self.endpoint(
            std::iter::once("project")
                .chain(project_path.split('/'))
                .chain(std::iter::once("runs")),
        )?;
        let params: Vec<(&str, String)> = filters
            .into_iter()
            .flatten()
            .map(|(k, v)| (k.as_str(), coerce_str(Some(v))))
            .collect();
        self.get_list(url, &params)
    }

    fn run(&self, path: &str) -> Result<RemoteObject> {
        self.get_one(self.endpoint(std::iter::once("experiment").chain(path.split('/')))?)
    }

    fn metric_columns(&self, run_path: &str) -> Result<Vec<RemoteObject>> {
        let url = self.endpoint(
            std::iter::once("experiment")
                .chain(run_path.split('/'))
                .chain(std::iter::once("column")),
        )?;
        self.get_list(url, &[("all", "true".to_string())])
    }

    fn metrics(
        &self,
        run_path: &str,
        keys: &[String],
        x_axis: &str,
        sample: Option<u64>,
    ) -> Result<Value> {
        let url = self.endpoint(
            std::iter::once("experiment")
                .chain(run_path.split('/'))
                .chain(std::iter::once("metrics")),
        )?;
        let mut params: Vec<(&str, String)> = keys.iter().map(|k| ("keys", k.clone())).collect();
        params.push(("x_axis", x_axis.to_string()));
        if let Some(n) = sample {
            params.push(("sample", n.to_string()));
        }
        Ok(unwrap_single(self.get(url, &params)?))
    }
}

/// Items of a list response: a bare array, or one wrapped in `list` or `data`
pub(crate) fn unwrap_list(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        Value::Object(mut map) => {
            for key in ["list", "data"] {
                match map.remove(key) {
                    Some(Value::Array(items)) => return Ok(items),
                    Some(Value::Null) => return Ok(Vec::new()),
                    Some(inner @ Value::Object(_)) => return unwrap_list(inner),
                    _ => {}
                }
            }
            Err(SwanError::UnsupportedShape(
                "list response must be an array or hold `list`/`data`".into(),
            ))
        }
        _ => Err(SwanError::UnsupportedShape(
            "list response must be an array".into(),
        )),
    }
}

/// Body of a single-object response with any `data` envelope removed
pub(crate) fn unwrap_single(body: Value) -> Value {
    match body {
        Value::Object(mut map)
            if map.get("data").map_or(false, Value::is_object)
                && map.keys().all(|k| ENVELOPE_KEYS.contains(&k.as_str())) =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn error_message(body: &str, reason: Option<&str>) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["message", "detail", "error"]
            .iter()
            .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
    });
    match from_json {
        Some(msg) => msg,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => reason.unwrap_or("request failed").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> SwanConfig {
        SwanConfig {
            api_key: Some("sk-test".into()),
            api_host: "http://localhost:9/".into(),
            ..SwanConfig::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        let err = HttpApi::new(&SwanConfig::default()).err().unwrap();
        assert!(matches!(err, SwanError::Configuration(_)));
    }

    #[test]
    fn test_endpoint_layout() {
        let api = HttpApi::new(&config()).unwrap();
        let url = api
            .endpoint(std::iter::once("experiment").chain("alice/mnist/run 1".split('/')))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:9/api/experiment/alice/mnist/run%201");
        assert_eq!(api.family(), ObjectFamily::Plain);
    }

    #[test]
    fn test_unwrap_list_shapes() {
        assert_eq!(unwrap_list(json!([1, 2])).unwrap().len(), 2);
        assert_eq!(unwrap_list(json!({"list": [1]})).unwrap(), vec![json!(1)]);
        assert_eq!(unwrap_list(json!({"data": {"list": [1, 2, 3]}})).unwrap().len(), 3);
        assert!(unwrap_list(json!({"data": null})).unwrap().is_empty());
        assert!(unwrap_list(json!({"total": 3})).is_err());
        assert!(unwrap_list(json!("x")).is_err());
    }

    #[test]
    fn test_unwrap_single_envelope() {
        assert_eq!(unwrap_single(json!({"code": 0, "data": {"a": 1}})), json!({"a": 1}));
        // a real object that happens to carry a `data` field is left alone
        let obj = json!({"name": "x", "data": {"a": 1}});
        assert_eq!(unwrap_single(obj.clone()), obj);
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message": "not found"}"#, Some("Not Found")), "not found");
        assert_eq!(error_message("boom", None), "boom");
        assert_eq!(error_message("", Some("Forbidden")), "Forbidden");
    }
}
