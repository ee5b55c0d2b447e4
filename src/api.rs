//! JSON request handling for the three issuer endpoints.
//!
//! | endpoint                | handler              |
//! |-------------------------|----------------------|
//! | `GET /api/v1/keys`      | [`Service::keys`]     |
//! | `POST /api/v1/evaluate` | [`Service::evaluate`] |
//! | `POST /api/v1/redeem`   | [`Service::redeem`]   |
//!
//! Handlers take raw request bodies and return a status code with a JSON
//! body; routing and the HTTP server itself live with the caller. Errors are
//! reported as `{"error": ...}` and never include internal detail.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::dleq::DleqProof;
use crate::errors::Error;
use crate::group::compressed_from_hex;
use crate::keys::PublicKey;
use crate::server::{Evaluation, Server};
use crate::voprf::{BlindedElement, EvaluatedElement, Token};

pub const BLINDED_ELEMENT_REQUIRED: &str = "blindedElement is required";
pub const MALFORMED_BODY: &str = "malformed request body";
pub const EVALUATION_FAILED: &str = "Failed to evaluate blinded element.";
pub const TOKEN_INVALID_OR_USED: &str = "Token invalid or already used.";
pub const INTERNAL_ERROR: &str = "Internal server error.";

/// A handler result: HTTP status and JSON body.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn ok<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Response { status: 200, body },
            Err(err) => {
                warn!(%err, "failed to encode response");
                Response::error(500, INTERNAL_ERROR)
            }
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Response {
            status,
            body: json!({ "error": message }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct KeysResponse {
    pub public_key: PublicKey,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct EvaluateRequest {
    blinded_element: Option<String>,
}

/// The body of a successful evaluation.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub evaluated_element: String,
    pub proof: DleqProof,
}

impl EvaluateResponse {
    /// Decodes the response into an [`Evaluation`], validating the element.
    pub fn into_evaluation(self) -> Result<Evaluation, Error> {
        Ok(Evaluation {
            evaluated: EvaluatedElement::from_hex(&self.evaluated_element)?,
            proof: self.proof,
        })
    }
}

impl From<&Evaluation> for EvaluateResponse {
    fn from(evaluation: &Evaluation) -> Self {
        EvaluateResponse {
            evaluated_element: evaluation.evaluated.to_hex(),
            proof: evaluation.proof,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RedeemRequest {
    token: Option<TokenFields>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenFields {
    nonce: Option<String>,
    output: Option<String>,
}

/// Request-serving front end over a shared [`Server`].
#[derive(Clone, Debug)]
pub struct Service {
    server: Arc<Server>,
}

impl Service {
    pub fn new(server: Arc<Server>) -> Self {
        Service { server }
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    /// `GET /api/v1/keys`
    pub fn keys(&self) -> Response {
        Response::ok(&KeysResponse {
            public_key: self.server.public_key(),
        })
    }

    /// `POST /api/v1/evaluate`
    pub fn evaluate(&self, body: &[u8]) -> Response {
        let request: EvaluateRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(err) => {
                warn!(%err, "unparsable evaluate request");
                return Response::error(400, MALFORMED_BODY);
            }
        };
        let encoded = match request.blinded_element {
            Some(encoded) if !encoded.is_empty() => encoded,
            _ => {
                warn!("evaluate request without a blinded element");
                return Response::error(400, BLINDED_ELEMENT_REQUIRED);
            }
        };
        let blinded = match BlindedElement::from_hex(&encoded) {
            Ok(blinded) => blinded,
            Err(err) => {
                warn!(%err, "evaluation failed");
                return Response::error(500, EVALUATION_FAILED);
            }
        };

        let evaluation = self.server.evaluate(&blinded, &mut rand::rngs::OsRng);
        Response::ok(&EvaluateResponse::from(&evaluation))
    }

    /// `POST /api/v1/redeem`
    pub fn redeem(&self, body: &[u8]) -> Response {
        let token = match parse_token(body) {
            Some(token) => token,
            None => {
                warn!("unparsable redeem request");
                return Response::error(400, TOKEN_INVALID_OR_USED);
            }
        };
        match self.server.redeem(&token) {
            Ok(()) => Response::ok(&json!({ "status": "success" })),
            Err(err) if !err.is_client_fault() => {
                warn!(%err, "redemption failed internally");
                Response::error(500, INTERNAL_ERROR)
            }
            Err(_) => Response::error(400, TOKEN_INVALID_OR_USED),
        }
    }
}

/// Extracts a token from a redeem body; any shape problem yields `None`.
fn parse_token(body: &[u8]) -> Option<Token> {
    let request: RedeemRequest = serde_json::from_slice(body).ok()?;
    let fields = request.token?;
    let output = compressed_from_hex(&fields.output?).ok()?;
    Some(Token::new(fields.nonce?, output))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::client::Client;
    use crate::config::Config;
    use crate::keys::KeyPair;

    fn service() -> Service {
        let server = Server::with_keypair(KeyPair::from_seed([13u8; 32]), &Config::default());
        Service::new(Arc::new(server))
    }

    fn issue(service: &Service, nonce: &str) -> Token {
        let mut csrng = rand::rngs::OsRng;
        let keys: KeysResponse = serde_json::from_value(service.keys().body).unwrap();
        let client = Client::new(keys.public_key);

        let (pending, blinded) = client.request(nonce, &mut csrng).unwrap();
        let body = json!({ "blindedElement": blinded.to_hex() }).to_string();
        let response = service.evaluate(body.as_bytes());
        assert_eq!(response.status, 200);

        let evaluation: EvaluateResponse = serde_json::from_value(response.body).unwrap();
        pending
            .finalize(&client, &evaluation.into_evaluation().unwrap())
            .unwrap()
    }

    #[test]
    fn keys_endpoint() {
        let service = service();
        let response = service.keys();
        assert_eq!(response.status, 200);
        assert_eq!(
            response.body,
            json!({ "publicKey": service.server().public_key().to_hex() })
        );
    }

    #[test]
    fn evaluate_endpoint() {
        let service = service();
        let token = issue(&service, "abc");
        assert_eq!(token.nonce(), "abc");

        let mut csrng = rand::rngs::OsRng;
        let (_, blinded) = Client::new(service.server().public_key())
            .request("abc", &mut csrng)
            .unwrap();
        let body = json!({ "blindedElement": blinded.to_hex() }).to_string();
        let response = service.evaluate(body.as_bytes());
        let proof = &response.body["proof"];
        assert!(proof["c"].is_string());
        assert!(proof["s"].is_string());
        assert_eq!(response.body["evaluatedElement"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn evaluate_endpoint_errors() {
        let service = service();

        let missing = service.evaluate(b"{}");
        assert_eq!(missing, Response::error(400, BLINDED_ELEMENT_REQUIRED));

        let null = service.evaluate(br#"{"blindedElement": null}"#);
        assert_eq!(null, Response::error(400, BLINDED_ELEMENT_REQUIRED));

        let empty = service.evaluate(br#"{"blindedElement": ""}"#);
        assert_eq!(empty, Response::error(400, BLINDED_ELEMENT_REQUIRED));

        let garbage = service.evaluate(b"not json");
        assert_eq!(garbage, Response::error(400, MALFORMED_BODY));

        let unknown = service.evaluate(br#"{"blindedElement": "00", "extra": 1}"#);
        assert_eq!(unknown.status, 400);

        let body = json!({ "blindedElement": "ff".repeat(32) }).to_string();
        let invalid = service.evaluate(body.as_bytes());
        assert_eq!(invalid, Response::error(500, EVALUATION_FAILED));
    }

    #[test]
    fn redeem_endpoint() {
        let service = service();
        let token = issue(&service, "abc");
        let body = json!({ "token": token }).to_string();

        let first = service.redeem(body.as_bytes());
        assert_eq!(first.status, 200);
        assert_eq!(first.body, json!({ "status": "success" }));

        let second = service.redeem(body.as_bytes());
        assert_eq!(second, Response::error(400, TOKEN_INVALID_OR_USED));
    }

    #[test]
    fn redeem_errors_are_indistinguishable() {
        let service = service();
        let token = issue(&service, "abc");
        let expected = Response::error(400, TOKEN_INVALID_OR_USED);

        let bodies = vec![
            "{}".to_string(),
            "[1, 2]".to_string(),
            json!({ "token": { "nonce": "abc" } }).to_string(),
            json!({ "token": { "output": hex::encode(token.output().as_bytes()) } }).to_string(),
            json!({ "token": { "nonce": "abc", "output": "zz" } }).to_string(),
            json!({ "token": { "nonce": "abc", "output": "01".repeat(32) } }).to_string(),
            json!({ "token": { "nonce": "abd", "output": hex::encode(token.output().as_bytes()) } })
                .to_string(),
        ];
        for body in &bodies {
            assert_eq!(service.redeem(body.as_bytes()), expected, "body: {}", body);
        }

        // None of the failures above consumed the nonce.
        let body = json!({ "token": token }).to_string();
        assert_eq!(service.redeem(body.as_bytes()).status, 200);
    }
}
