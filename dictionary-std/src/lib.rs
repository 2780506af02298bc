//! The bundled default PQDIF tag-definition document.
//!
//! [`pqdif-object`](https://docs.rs/pqdif-object)'s tag registry consults a
//! document named by the caller in the working directory first, falling
//! back to the copy embedded here when no such file exists (§6).

/// The bundled tag-definition document, in the `<tags>`/`<tagValues>`
/// schema described in §6.
pub const DEFAULT_TAGS_XML: &str = include_str!("tags.xml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_document_is_well_formed_enough_to_parse() {
        let mut reader = quick_xml::Reader::from_str(DEFAULT_TAGS_XML);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("bundled tags.xml is not well-formed XML: {e}"),
            }
            buf.clear();
        }
    }
}
