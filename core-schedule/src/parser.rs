//! XML decoding of schedule documents.

use crate::error::{Result, ScheduleError};
use crate::model::{Schedule, ROOT_ELEMENT};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Parse a schedule document.
///
/// Only the document shape is enforced: the root element must be
/// [`ROOT_ELEMENT`] and the body must be well-formed XML. Leaves that are
/// missing or malformed take their zero value.
pub fn parse_schedule(body: &str) -> Result<Schedule> {
    check_root(body)?;
    quick_xml::de::from_str(body).map_err(|e| ScheduleError::Parse(e.to_string()))
}

fn check_root(body: &str) -> Result<()> {
    let mut reader = Reader::from_str(body);

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                let name = element.name();
                return if name.as_ref() == ROOT_ELEMENT.as_bytes() {
                    Ok(())
                } else {
                    Err(ScheduleError::Parse(format!(
                        "unexpected root element <{}>",
                        String::from_utf8_lossy(name.as_ref())
                    )))
                };
            }
            Ok(Event::Eof) => {
                return Err(ScheduleError::Parse("empty schedule document".to_string()))
            }
            Ok(_) => continue,
            Err(e) => return Err(ScheduleError::Parse(e.to_string())),
        }
    }
}
