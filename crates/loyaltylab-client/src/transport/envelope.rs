//! SOAP 1.1 envelope encoding and decoding
//!
//! Request values map onto elements one to one: objects nest, arrays repeat
//! the element, `null` becomes an empty element. Responses are decoded into
//! a JSON tree keyed by element local name; `true`/`false` text becomes a
//! boolean and every other leaf stays a string.

use super::{SoapRequest, TransportError, TransportResult};
use loyaltylab_core::{FaultDetail, SoapFault, SoapResponse};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value as JsonValue};
use std::io::Cursor;

pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

fn xml_err(err: impl std::fmt::Display) -> TransportError {
    TransportError::Envelope(err.to_string())
}

/// Serialize a request into a SOAP envelope bound to `namespace`.
pub fn encode_envelope(request: &SoapRequest, namespace: &str) -> TransportResult<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_err)?;

    let mut envelope = BytesStart::new("soap:Envelope");
    envelope.push_attribute(("xmlns:soap", SOAP_ENV_NS));
    envelope.push_attribute(("xmlns:xsi", XSI_NS));
    envelope.push_attribute(("xmlns:xsd", XSD_NS));
    envelope.push_attribute(("xmlns:wsdl", namespace));
    writer.write_event(Event::Start(envelope)).map_err(xml_err)?;

    if let Some(header) = &request.header {
        writer
            .write_event(Event::Start(BytesStart::new("soap:Header")))
            .map_err(xml_err)?;
        write_children(&mut writer, header)?;
        writer
            .write_event(Event::End(BytesEnd::new("soap:Header")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::Start(BytesStart::new("soap:Body")))
        .map_err(xml_err)?;
    write_element(&mut writer, &request.element_name(), &request.body)?;
    writer
        .write_event(Event::End(BytesEnd::new("soap:Body")))
        .map_err(xml_err)?;

    writer
        .write_event(Event::End(BytesEnd::new("soap:Envelope")))
        .map_err(xml_err)?;

    String::from_utf8(writer.into_inner().into_inner()).map_err(xml_err)
}

fn write_children(writer: &mut Writer<Cursor<Vec<u8>>>, value: &JsonValue) -> TransportResult<()> {
    match value {
        JsonValue::Object(map) => {
            for (name, child) in map {
                write_element(writer, name, child)?;
            }
            Ok(())
        }
        JsonValue::Null => Ok(()),
        other => Err(TransportError::Envelope(format!(
            "expected an object of elements, got {other}"
        ))),
    }
}

fn write_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    value: &JsonValue,
) -> TransportResult<()> {
    match value {
        JsonValue::Object(_) => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(xml_err)?;
            write_children(writer, value)?;
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_err)?;
        }
        JsonValue::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
        }
        JsonValue::Null => {
            writer
                .write_event(Event::Empty(BytesStart::new(name)))
                .map_err(xml_err)?;
        }
        JsonValue::Bool(flag) => write_text(writer, name, if *flag { "true" } else { "false" })?,
        JsonValue::Number(number) => write_text(writer, name, &number.to_string())?,
        JsonValue::String(text) => write_text(writer, name, text)?,
    }
    Ok(())
}

fn write_text(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, text: &str) -> TransportResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)?;
    Ok(())
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    nil: bool,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn from_start(start: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let nil = start.attributes().flatten().any(|attr| {
            attr.key.local_name().as_ref() == b"nil" && attr.value.as_ref() == b"true"
        });
        Self {
            name,
            nil,
            ..Self::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|child| child.name.eq_ignore_ascii_case(name))
    }

    fn text_of(&self, name: &str) -> Option<String> {
        self.child(name)
            .filter(|child| !child.nil && !child.text.is_empty())
            .map(|child| child.text.clone())
    }

    fn to_json(&self) -> JsonValue {
        if self.nil {
            return JsonValue::Null;
        }
        if self.children.is_empty() {
            return match self.text.as_str() {
                "" => JsonValue::Null,
                "true" => JsonValue::Bool(true),
                "false" => JsonValue::Bool(false),
                text => JsonValue::String(text.to_string()),
            };
        }

        let mut map = Map::new();
        for child in &self.children {
            let value = child.to_json();
            match map.get_mut(&child.name) {
                Some(JsonValue::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = JsonValue::Array(vec![first, value]);
                }
                None => {
                    map.insert(child.name.clone(), value);
                }
            }
        }
        JsonValue::Object(map)
    }
}

fn parse_document(xml: &str) -> TransportResult<Node> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack = vec![Node::default()];
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(start) => stack.push(Node::from_start(&start)),
            Event::Empty(start) => {
                let node = Node::from_start(&start);
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(TransportError::Envelope("unbalanced closing tag".to_string()));
                }
                if let Some(node) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(node);
                    }
                }
            }
            Event::Text(text) => {
                let unescaped = text.unescape().map_err(xml_err)?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(root), true) => Ok(root),
        _ => Err(TransportError::Envelope("unexpected end of document".to_string())),
    }
}

fn decode_fault(node: &Node) -> SoapFault {
    SoapFault {
        faultcode: node.text_of("faultcode"),
        faultstring: node.text_of("faultstring"),
        detail: node
            .child("detail")
            .map(|detail| FaultDetail {
                code: detail.text_of("code"),
                description: detail.text_of("description"),
            })
            .filter(|detail| detail.code.is_some() || detail.description.is_some()),
    }
}

/// Decode an HTTP response body into a [`SoapResponse`].
///
/// Error statuses whose body is not a SOAP envelope are returned as plain
/// HTTP errors so the fault classifier can report the raw body.
pub fn decode_response(status_code: u16, raw: String) -> TransportResult<SoapResponse> {
    let body = match parse_document(&raw) {
        Ok(root) => root
            .child("Envelope")
            .and_then(|envelope| envelope.child("Body"))
            .map(decode_body),
        Err(err) if status_code < 400 => return Err(err),
        Err(_) => None,
    };

    match body {
        Some((body, fault)) => Ok(SoapResponse {
            status_code,
            body,
            fault,
            raw,
        }),
        None if status_code >= 400 => Ok(SoapResponse::http_error(status_code, raw)),
        None => Err(TransportError::Envelope(
            "response is not a SOAP envelope".to_string(),
        )),
    }
}

fn decode_body(body: &Node) -> (JsonValue, Option<SoapFault>) {
    match body.child("Fault") {
        Some(fault) => (JsonValue::Null, Some(decode_fault(fault))),
        None => (body.to_json(), None),
    }
}
