//! The `application/xml` representation, outbound only.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde_json::Value;

use crate::content::{ContentProducer, ContentType};
use crate::header::accept::AcceptHeader;
use crate::request::Request;
use crate::response::Response;

const MEDIA_TYPE: &str = "application/xml";

/// XML in UTF-8 for response bodies. Request bodies are not consumed as XML,
/// a body value has no canonical shape to read back from it.
#[derive(Debug, Default)]
pub struct ApplicationXml;

impl ApplicationXml {
    pub fn new() -> ApplicationXml {
        ApplicationXml
    }
}

impl ContentType for ApplicationXml {
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
        Some(Box::new(XmlProducer::new()))
    }
}

/// Serializes the body value as XML under a `response` root element. Object
/// keys become element names and arrays repeat the enclosing element.
#[derive(Debug, Default)]
pub struct XmlProducer {
    body: Option<Value>,
}

impl XmlProducer {
    pub fn new() -> XmlProducer {
        XmlProducer { body: None }
    }
}

impl ContentProducer for XmlProducer {
    fn prepare(&mut self, response: &mut Response) {
        self.body = response.body().cloned();
        response.set_header("Content-Type", &format!("{MEDIA_TYPE}; charset={}", mime::UTF_8));
    }

    fn produce(&self, out: &mut dyn Write) -> io::Result<()> {
        let Some(body) = &self.body else {
            return Ok(());
        };
        let mut writer = Writer::new(out);
        write_element(&mut writer, "response", body)
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, name: &str, value: &Value) -> io::Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
            Ok(())
        }
        Value::Object(fields) => {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            for (key, field) in fields {
                write_element(writer, key, field)?;
            }
            writer.write_event(Event::End(BytesEnd::new(name)))
        }
        scalar => {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            writer.write_event(Event::Text(BytesText::new(&scalar_text(scalar))))?;
            writer.write_event(Event::End(BytesEnd::new(name)))
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => unreachable!("handled by write_element"),
    }
}
