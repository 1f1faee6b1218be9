//! XML-RPC codec for the subset of the protocol rTorrent speaks.
//!
//! Requests are written as plain strings; responses are read with quick-xml into a
//! small element tree and then interpreted as [`Value`]s.

use std::collections::BTreeMap;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use thiserror::Error;

const XML_HEADER: &str = r#"<?xml version="1.0"?>"#;

/// Errors produced by the XML-RPC transport and codec.
#[derive(Error, Debug)]
pub enum XmlRpcError {
    /// The HTTP request failed (connect, timeout, body read, ...)
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success HTTP status
    #[error("HTTP status {0}")]
    Status(u16),

    /// The daemon answered with an XML-RPC fault
    #[error("fault {code}: {message}")]
    Fault {
        /// `faultCode` member of the fault struct.
        code: i64,
        /// `faultString` member of the fault struct.
        message: String,
    },

    /// The document is not a well-formed XML-RPC message
    #[error("malformed XML-RPC message: {0}")]
    Malformed(String),
}

/// An XML-RPC value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `<i4>`, `<int>` or `<i8>`.
    Int(i64),
    /// `<boolean>`.
    Bool(bool),
    /// `<double>`.
    Double(f64),
    /// `<string>`, or a `<value>` without a type element.
    String(String),
    /// `<array>`.
    Array(Vec<Value>),
    /// `<struct>`.
    Struct(BTreeMap<String, Value>),
}

impl Value {
    /// The integer held by this value, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The string held by this value, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The elements of this value, if it is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    /// XML-RPC type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "boolean",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(values: Vec<V>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

/// Encode a `methodCall` document.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut xml = String::from(XML_HEADER);
    xml.push_str("<methodCall><methodName>");
    xml.push_str(&escape(method));
    xml.push_str("</methodName><params>");
    for param in params {
        xml.push_str("<param>");
        write_value(&mut xml, param);
        xml.push_str("</param>");
    }
    xml.push_str("</params></methodCall>");
    xml
}

/// Encode a successful `methodResponse` document carrying one value.
pub fn encode_response(value: &Value) -> String {
    let mut xml = String::from(XML_HEADER);
    xml.push_str("<methodResponse><params><param>");
    write_value(&mut xml, value);
    xml.push_str("</param></params></methodResponse>");
    xml
}

/// Encode a fault `methodResponse` document.
pub fn encode_fault(code: i64, message: &str) -> String {
    let fault = Value::Struct(BTreeMap::from([
        ("faultCode".to_string(), Value::Int(code)),
        ("faultString".to_string(), Value::from(message)),
    ]));
    let mut xml = String::from(XML_HEADER);
    xml.push_str("<methodResponse><fault>");
    write_value(&mut xml, &fault);
    xml.push_str("</fault></methodResponse>");
    xml
}

fn write_value(xml: &mut String, value: &Value) {
    xml.push_str("<value>");
    match value {
        Value::Int(i) => {
            xml.push_str("<i8>");
            xml.push_str(&i.to_string());
            xml.push_str("</i8>");
        }
        Value::Bool(b) => {
            xml.push_str(if *b {
                "<boolean>1</boolean>"
            } else {
                "<boolean>0</boolean>"
            });
        }
        Value::Double(d) => {
            xml.push_str("<double>");
            xml.push_str(&d.to_string());
            xml.push_str("</double>");
        }
        Value::String(s) => {
            xml.push_str("<string>");
            xml.push_str(&escape(s.as_str()));
            xml.push_str("</string>");
        }
        Value::Array(values) => {
            xml.push_str("<array><data>");
            for v in values {
                write_value(xml, v);
            }
            xml.push_str("</data></array>");
        }
        Value::Struct(members) => {
            xml.push_str("<struct>");
            for (name, v) in members {
                xml.push_str("<member><name>");
                xml.push_str(&escape(name.as_str()));
                xml.push_str("</name>");
                write_value(xml, v);
                xml.push_str("</member>");
            }
            xml.push_str("</struct>");
        }
    }
    xml.push_str("</value>");
}

/// Decode a `methodResponse` document.
///
/// A fault response is returned as [`XmlRpcError::Fault`].
pub fn decode_response(xml: &[u8]) -> Result<Value, XmlRpcError> {
    let root = parse_document(xml)?;
    expect_root(&root, "methodResponse")?;

    if let Some(fault) = root.child("fault") {
        let value = decode_value(required(fault, "value")?)?;
        return Err(fault_from(value));
    }

    let params = required(&root, "params")?;
    let mut param_iter = params.children_named("param");
    match (param_iter.next(), param_iter.next()) {
        (Some(param), None) => decode_value(required(param, "value")?),
        _ => Err(XmlRpcError::Malformed(
            "expected exactly one response param".into(),
        )),
    }
}

/// Decode a `methodCall` document into its method name and parameters.
pub fn decode_call(xml: &[u8]) -> Result<(String, Vec<Value>), XmlRpcError> {
    let root = parse_document(xml)?;
    expect_root(&root, "methodCall")?;

    let method = required(&root, "methodName")?.text.trim().to_string();
    let params = match root.child("params") {
        Some(params) => params
            .children_named("param")
            .map(|param| required(param, "value").and_then(decode_value))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok((method, params))
}

fn fault_from(value: Value) -> XmlRpcError {
    let mut members = match value {
        Value::Struct(members) => members,
        other => {
            return XmlRpcError::Malformed(format!(
                "fault value is a {}, not a struct",
                other.type_name()
            ));
        }
    };
    let code = members
        .get("faultCode")
        .and_then(Value::as_i64)
        .unwrap_or_default();
    let message = match members.remove("faultString") {
        Some(Value::String(s)) => s,
        _ => String::new(),
    };
    XmlRpcError::Fault { code, message }
}

fn decode_value(element: &Element) -> Result<Value, XmlRpcError> {
    let typed = match element.children.as_slice() {
        [] => return Ok(Value::String(element.text.clone())),
        [typed] => typed,
        _ => {
            return Err(XmlRpcError::Malformed(
                "<value> holds more than one element".into(),
            ));
        }
    };

    match typed.name.as_str() {
        "i4" | "int" | "i8" => typed
            .text
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| XmlRpcError::Malformed(format!("invalid integer {:?}: {e}", typed.text))),
        "boolean" => match typed.text.trim() {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(XmlRpcError::Malformed(format!("invalid boolean {other:?}"))),
        },
        "double" => typed
            .text
            .trim()
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|e| XmlRpcError::Malformed(format!("invalid double {:?}: {e}", typed.text))),
        "string" => Ok(Value::String(typed.text.clone())),
        "array" => required(typed, "data")?
            .children_named("value")
            .map(decode_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children_named("member") {
                let name = required(member, "name")?.text.clone();
                let value = decode_value(required(member, "value")?)?;
                members.insert(name, value);
            }
            Ok(Value::Struct(members))
        }
        other => Err(XmlRpcError::Malformed(format!(
            "unsupported value type <{other}>"
        ))),
    }
}

/// Element tree node. Text is the concatenation of the direct text content.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn required<'a>(parent: &'a Element, name: &str) -> Result<&'a Element, XmlRpcError> {
    parent.child(name).ok_or_else(|| {
        XmlRpcError::Malformed(format!("missing <{name}> in <{}>", parent.name))
    })
}

fn expect_root(root: &Element, name: &str) -> Result<(), XmlRpcError> {
    if root.name == name {
        Ok(())
    } else {
        Err(XmlRpcError::Malformed(format!(
            "expected <{name}>, found <{}>",
            root.name
        )))
    }
}

fn parse_document(xml: &[u8]) -> Result<Element, XmlRpcError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => stack.push(Element::new(e.local_name().as_ref())),
            Ok(Event::Empty(e)) => {
                attach(&mut stack, &mut root, Element::new(e.local_name().as_ref()))?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlRpcError::Malformed("unbalanced closing tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                if let Some(top) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| XmlRpcError::Malformed(format!("XML parse error: {e}")))?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XmlRpcError::Malformed(format!("XML parse error: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(XmlRpcError::Malformed("unexpected end of document".into()));
    }
    root.ok_or_else(|| XmlRpcError::Malformed("empty document".into()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlRpcError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(XmlRpcError::Malformed("multiple root elements".into())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_call_with_string_params() {
        let xml = encode_call("download_list", &[Value::from(""), Value::from("started")]);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?><methodCall><methodName>download_list</methodName><params>\
             <param><value><string></string></value></param>\
             <param><value><string>started</string></value></param>\
             </params></methodCall>"
        );
    }

    #[test]
    fn encode_call_escapes_text() {
        let xml = encode_call("d.base_filename", &[Value::from("a<b&c")]);
        assert!(xml.contains("<string>a&lt;b&amp;c</string>"));
    }

    #[test]
    fn decode_call_reads_back_params() {
        let xml = encode_call(
            "t.multicall",
            &[Value::from("HASH"), Value::from(""), Value::from("t.url=")],
        );
        let (method, params) = decode_call(xml.as_bytes()).unwrap();
        assert_eq!(method, "t.multicall");
        assert_eq!(
            params,
            vec![Value::from("HASH"), Value::from(""), Value::from("t.url=")]
        );
    }

    #[test]
    fn decode_call_without_params() {
        let xml = "<?xml version=\"1.0\"?><methodCall><methodName>get_down_rate</methodName></methodCall>";
        let (method, params) = decode_call(xml.as_bytes()).unwrap();
        assert_eq!(method, "get_down_rate");
        assert!(params.is_empty());
    }

    #[test]
    fn decode_integer_variants() {
        for tag in ["i4", "int", "i8"] {
            let xml = format!(
                "<methodResponse><params><param><value><{tag}>1024</{tag}></value></param></params></methodResponse>"
            );
            assert_eq!(decode_response(xml.as_bytes()).unwrap(), Value::Int(1024));
        }
    }

    #[test]
    fn decode_untyped_value_is_string() {
        let xml = "<methodResponse><params><param><value>foobar</value></param></params></methodResponse>";
        assert_eq!(
            decode_response(xml.as_bytes()).unwrap(),
            Value::from("foobar")
        );
    }

    #[test]
    fn decode_string_keeps_whitespace_and_entities() {
        let xml = "<methodResponse><params><param><value><string> a &amp; b </string></value></param></params></methodResponse>";
        assert_eq!(
            decode_response(xml.as_bytes()).unwrap(),
            Value::from(" a & b ")
        );
    }

    #[test]
    fn decode_empty_string_element() {
        let xml = "<methodResponse><params><param><value><string/></value></param></params></methodResponse>";
        assert_eq!(decode_response(xml.as_bytes()).unwrap(), Value::from(""));
    }

    #[test]
    fn decode_array_preserves_order() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<methodResponse>
  <params>
    <param>
      <value><array><data>
        <value><string>CCCC</string></value>
        <value><string>AAAA</string></value>
        <value><string>BBBB</string></value>
      </data></array></value>
    </param>
  </params>
</methodResponse>"#;
        assert_eq!(
            decode_response(xml.as_bytes()).unwrap(),
            Value::from(vec!["CCCC", "AAAA", "BBBB"])
        );
    }

    #[test]
    fn decode_nested_rows() {
        let response = encode_response(&Value::Array(vec![
            Value::from(vec!["http://a/announce"]),
            Value::from(vec!["http://b/announce"]),
        ]));
        let value = decode_response(response.as_bytes()).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].as_array().unwrap()[0].as_str(), Some("http://b/announce"));
    }

    #[test]
    fn decode_fault() {
        let xml = encode_fault(-506, "Method 'get_down_rate' not defined");
        match decode_response(xml.as_bytes()) {
            Err(XmlRpcError::Fault { code, message }) => {
                assert_eq!(code, -506);
                assert_eq!(message, "Method 'get_down_rate' not defined");
            }
            other => panic!("Expected Fault, got {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode_response(b"this is not xml"),
            Err(XmlRpcError::Malformed(_))
        ));
        assert!(matches!(
            decode_response(b""),
            Err(XmlRpcError::Malformed(_))
        ));
        assert!(matches!(
            decode_response(b"<methodResponse><params><param><value><i4>12"),
            Err(XmlRpcError::Malformed(_))
        ));
    }

    #[test]
    fn decode_rejects_wrong_root_and_bad_ints() {
        assert!(matches!(
            decode_response(b"<methodCall><methodName>x</methodName></methodCall>"),
            Err(XmlRpcError::Malformed(_))
        ));
        assert!(matches!(
            decode_response(
                b"<methodResponse><params><param><value><i8>abc</i8></value></param></params></methodResponse>"
            ),
            Err(XmlRpcError::Malformed(_))
        ));
    }

    #[test]
    fn decode_rejects_missing_param() {
        assert!(matches!(
            decode_response(b"<methodResponse><params></params></methodResponse>"),
            Err(XmlRpcError::Malformed(_))
        ));
    }

    #[test]
    fn decode_struct_and_scalars() {
        let value = Value::Struct(BTreeMap::from([
            ("enabled".to_string(), Value::Bool(true)),
            ("ratio".to_string(), Value::Double(1.5)),
            ("name".to_string(), Value::from("x")),
        ]));
        let xml = encode_response(&value);
        assert_eq!(decode_response(xml.as_bytes()).unwrap(), value);
    }
}
