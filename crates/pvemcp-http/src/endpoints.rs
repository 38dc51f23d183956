//! Authentication endpoint and its request/response types.

use serde::{Deserialize, Serialize};

/// Ticket endpoint, relative to the API base.
pub const ACCESS_TICKET: &str = "/access/ticket";

/// Form body for the ticket request.
#[derive(Serialize)]
pub(crate) struct TicketRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response from the ticket endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TicketResponse {
    pub data: TicketData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TicketData {
    pub ticket: String,
    #[serde(rename = "CSRFPreventionToken")]
    pub csrf_prevention_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ticket_response() {
        let body = r#"{"data":{"username":"root@pam","ticket":"PVE:root@pam:65F0::sig","CSRFPreventionToken":"65F0:tok","cap":{}}}"#;
        let parsed: TicketResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.ticket, "PVE:root@pam:65F0::sig");
        assert_eq!(parsed.data.csrf_prevention_token, "65F0:tok");
    }

    #[test]
    fn rejects_response_without_csrf_token() {
        let body = r#"{"data":{"ticket":"PVE:root@pam:65F0::sig"}}"#;
        assert!(serde_json::from_str::<TicketResponse>(body).is_err());
    }

    #[test]
    fn rejects_null_data() {
        assert!(serde_json::from_str::<TicketResponse>(r#"{"data":null}"#).is_err());
    }
}
