use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::error::Error;

/// Extracts the text inside `<AVAILABILITY><INSTOCKVALUE>...</INSTOCKVALUE></AVAILABILITY>`.
/// Payloads that fail to parse fail the item, not the batch.
pub fn decode_status(data_payload: &str) -> Result<String, Error> {
    let mut reader = Reader::from_str(data_payload);
    reader.config_mut().trim_text(true);

    let mut in_instock_value = false;
    let mut status = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) if tag.name().as_ref() == b"INSTOCKVALUE" => {
                in_instock_value = true;
            }
            Ok(Event::End(tag)) if tag.name().as_ref() == b"INSTOCKVALUE" => {
                in_instock_value = false;
            }
            Ok(Event::Text(text)) if in_instock_value => {
                let decoded = text
                    .decode()
                    .map_err(|e| Error::Decode(anyhow::anyhow!(e)))?;
                status = Some(decoded.into_owned());
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::Decode(anyhow::anyhow!(e))),
        }
    }

    status.ok_or_else(|| Error::Decode(anyhow::anyhow!("no INSTOCKVALUE element in payload")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_instock_value() {
        let payload = "<AVAILABILITY><INSTOCKVALUE>INSTOCK</INSTOCKVALUE></AVAILABILITY>";
        assert_eq!(decode_status(payload).unwrap(), "INSTOCK");
    }

    #[test]
    fn extracts_value_with_surrounding_siblings() {
        let payload =
            "<AVAILABILITY><ID>1</ID><INSTOCKVALUE>LESSTHAN10</INSTOCKVALUE></AVAILABILITY>";
        assert_eq!(decode_status(payload).unwrap(), "LESSTHAN10");
    }

    #[test]
    fn missing_element_fails_the_item() {
        let payload = "<AVAILABILITY><OTHER>x</OTHER></AVAILABILITY>";
        assert!(decode_status(payload).is_err());
    }

    #[test]
    fn malformed_xml_fails_the_item() {
        let payload = "<AVAILABILITY><INSTOCKVALUE>OUTOFSTOCK</AVAILABILITY>";
        assert!(decode_status(payload).is_err());
    }
}
