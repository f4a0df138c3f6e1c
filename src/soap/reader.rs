//! Streaming reader for SOAP response bodies.
//!
//! The response is consumed as a stream of XML events. The reader steps into
//! `Envelope`, `Body` and the action's response element, then binds the leaf
//! children of that element into a [`SoapRecord`]. Everything after the
//! response element is left in the underlying stream.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use tokio::io::AsyncBufRead;

use crate::error::SoapError;
use crate::response::SoapRecord;

/// Elements stepped into before binding, outermost first.
const LEVELS: [&str; 3] = ["<Envelope>", "<Body>", "the action response element"];

/// Reads one record from a SOAP response.
///
/// The reader should have `trim_text` enabled so whitespace between tags is
/// not reported as content.
pub async fn read_record<R, T>(reader: &mut Reader<R>) -> Result<T, SoapError>
where
    R: AsyncBufRead + Unpin,
    T: SoapRecord,
{
    if !descend(reader).await? {
        // <u:GetAddonInfosResponse/> carries no fields
        return Ok(T::default());
    }
    bind(reader).await
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Steps past the start tags of the three outer levels. Returns `false` when
/// the innermost one is self-closing.
async fn descend<R>(reader: &mut Reader<R>) -> Result<bool, SoapError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut depth = 0;

    loop {
        buf.clear();
        match reader.read_event_into_async(&mut buf).await? {
            Event::Start(_) => {
                depth += 1;
                if depth == LEVELS.len() {
                    return Ok(true);
                }
            }
            Event::Empty(e) => {
                if depth + 1 == LEVELS.len() {
                    return Ok(false);
                }
                return Err(SoapError::UnexpectedContent {
                    expected: LEVELS[depth],
                    found: format!("empty element <{}/>", local_name(&e)),
                });
            }
            Event::End(e) => {
                return Err(SoapError::UnexpectedContent {
                    expected: LEVELS[depth],
                    found: format!(
                        "closing tag </{}>",
                        String::from_utf8_lossy(e.local_name().as_ref())
                    ),
                });
            }
            Event::Text(_) | Event::CData(_) => {
                return Err(SoapError::UnexpectedContent {
                    expected: LEVELS[depth],
                    found: "character data".to_string(),
                });
            }
            Event::Eof => return Err(SoapError::Truncated(LEVELS[depth])),
            // declaration, comments, processing instructions, doctype
            _ => {}
        }
    }
}

/// Binds the children of the current element until its closing tag.
async fn bind<R, T>(reader: &mut Reader<R>) -> Result<T, SoapError>
where
    R: AsyncBufRead + Unpin,
    T: SoapRecord,
{
    let mut record = T::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_event_into_async(&mut buf).await? {
            Event::Start(e) => {
                let element = local_name(&e);
                let qname = e.name().as_ref().to_vec();
                if let Some(text) = read_leaf(reader, &qname).await? {
                    record.assign(&element, &text)?;
                }
            }
            Event::Empty(e) => record.assign(&local_name(&e), "")?,
            Event::End(_) => return Ok(record),
            Event::Eof => return Err(SoapError::Truncated("the end of the action response")),
            _ => {}
        }
    }
}

/// Collects the text of a field element. Returns `None` for elements with
/// child elements, which no record field binds to.
async fn read_leaf<R>(reader: &mut Reader<R>, qname: &[u8]) -> Result<Option<String>, SoapError>
where
    R: AsyncBufRead + Unpin,
{
    let mut text = String::new();
    let mut nested = false;
    let mut buf = Vec::new();
    let mut skip = Vec::new();

    loop {
        buf.clear();
        match reader.read_event_into_async(&mut buf).await? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&c.decode().map_err(quick_xml::Error::from)?),
            Event::Start(e) => {
                let child = e.name().as_ref().to_vec();
                skip.clear();
                reader.read_to_end_into_async(QName(&child), &mut skip).await?;
                nested = true;
            }
            Event::Empty(_) => nested = true,
            Event::End(_) => return Ok((!nested).then_some(text)),
            Event::Eof => {
                return Err(SoapError::UnexpectedContent {
                    expected: "a closing tag",
                    found: format!("end of document inside <{}>", String::from_utf8_lossy(qname)),
                })
            }
            _ => {}
        }
    }
}
