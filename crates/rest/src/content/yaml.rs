//! The `application/x-yaml` representation, outbound only.

use std::io::{self, Write};

use serde_json::Value;

use crate::content::{ContentProducer, ContentType};
use crate::header::accept::AcceptHeader;
use crate::request::Request;
use crate::response::Response;

const MEDIA_TYPE: &str = "application/x-yaml";

/// YAML in UTF-8 for response bodies.
#[derive(Debug, Default)]
pub struct ApplicationYaml;

impl ApplicationYaml {
    pub fn new() -> ApplicationYaml {
        ApplicationYaml
    }
}

impl ContentType for ApplicationYaml {
    fn producer_for(
        &self,
        accept: &AcceptHeader,
        accept_charset: &AcceptHeader,
        request: Option<&Request>,
        response: &Response,
    ) -> Option<Box<dyn ContentProducer>> {
        request?;
        response.body()?;
        if !accept.accepts(MEDIA_TYPE) {
            return None;
        }
        if !accept_charset.accepts(mime::UTF_8.as_ref()) {
            return None;
        }
        Some(Box::new(YamlProducer::new()))
    }
}

/// Serializes the body value as YAML.
#[derive(Debug, Default)]
pub struct YamlProducer {
    body: Option<Value>,
}

impl YamlProducer {
    pub fn new() -> YamlProducer {
        YamlProducer { body: None }
    }
}

impl ContentProducer for YamlProducer {
    fn prepare(&mut self, response: &mut Response) {
        self.body = response.body().cloned();
        response.set_header("Content-Type", &format!("{MEDIA_TYPE}; charset={}", mime::UTF_8));
    }

    fn produce(&self, out: &mut dyn Write) -> io::Result<()> {
        match &self.body {
            Some(body) => serde_yaml::to_writer(out, body).map_err(io::Error::other),
            None => Ok(()),
        }
    }
}
