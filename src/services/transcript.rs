//! Plain-text transcript rendering for closed tickets.

use std::io::{self, Write};

use flate2::{Compression, write::GzEncoder};
use time::format_description::well_known::Rfc3339;

use crate::{dao::models::TicketEntity, state::TicketMessage};

/// Render the captured messages of a ticket into a plain-text transcript.
pub fn render(ticket: &TicketEntity, messages: &[TicketMessage]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Ticket {}\n", ticket.ticket_id));
    out.push_str(&format!("Mode: {}\n", ticket.mode));
    out.push_str(&format!("Player: {}\n", ticket.player_id));
    out.push_str(&format!("Tester: {}\n", ticket.tester_id));
    out.push_str(&format!("Opened: {}\n", stamp(ticket.opened_at)));
    out.push_str("----\n");

    if messages.is_empty() {
        out.push_str("(no messages captured)\n");
    }
    for message in messages {
        out.push_str(&format!(
            "[{}] {}: {}\n",
            stamp(message.sent_at),
            message.author_name,
            message.content
        ));
    }
    out
}

/// Gzip a rendered transcript for upload.
pub fn compress(text: &str) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes())?;
    encoder.finish()
}

/// Attachment name for a ticket's transcript.
pub fn file_name(ticket: &TicketEntity) -> String {
    format!("ticket-{}-{}.txt.gz", ticket.mode, ticket.ticket_id)
}

fn stamp(at: time::OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::state::tiers::Mode;

    fn ticket() -> TicketEntity {
        TicketEntity {
            ticket_id: Uuid::new_v4(),
            player_id: "1".into(),
            tester_id: "7".into(),
            mode: Mode::Sword,
            opened_at: OffsetDateTime::now_utc(),
        }
    }

    fn message(author: &str, content: &str) -> TicketMessage {
        TicketMessage {
            author_id: "1".into(),
            author_name: author.into(),
            content: content.into(),
            sent_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn render_lists_messages_in_order() {
        let text = render(
            &ticket(),
            &[message("steve", "hello"), message("tester", "ready?")],
        );
        assert!(text.contains("Mode: Sword"));
        let hello = text.find("steve: hello").unwrap();
        let ready = text.find("tester: ready?").unwrap();
        assert!(hello < ready);
    }

    #[test]
    fn render_marks_empty_buffers() {
        let text = render(&ticket(), &[]);
        assert!(text.contains("(no messages captured)"));
    }

    #[test]
    fn compressed_transcript_inflates_back() {
        let text = render(&ticket(), &[message("steve", "gg")]);
        let bytes = compress(&text).unwrap();

        let mut inflated = String::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_string(&mut inflated)
            .unwrap();
        assert_eq!(inflated, text);
    }
}
