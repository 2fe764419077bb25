#![allow(dead_code)]

pub mod fixtures;

use document_verifier_lib::{CancelToken, HttpResponse, Result, Transport, VerifyError};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// One scripted outcome of a request.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond(HttpResponse),
    NetworkDown,
}

impl Reply {
    pub fn status(status: u16) -> Self {
        Reply::Respond(HttpResponse::new(status, ""))
    }

    pub fn json(status: u16, body: Value) -> Self {
        Reply::Respond(HttpResponse::json_body(status, &body))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// Transport that plays back replies in order, then repeats `fallback`.
pub struct ScriptedTransport {
    replies: RefCell<VecDeque<Reply>>,
    fallback: Reply,
    calls: RefCell<Vec<Call>>,
    sign_outs: Cell<u32>,
    cancel_on_call: RefCell<Option<(usize, CancelToken)>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            fallback: Reply::status(500),
            calls: RefCell::new(Vec::new()),
            sign_outs: Cell::new(0),
            cancel_on_call: RefCell::new(None),
        }
    }

    pub fn always(reply: Reply) -> Self {
        let mut transport = Self::new(Vec::new());
        transport.fallback = reply;
        transport
    }

    /// Cancels `token` while serving call number `n` (1-based).
    pub fn cancel_during_call(self, n: usize, token: CancelToken) -> Self {
        *self.cancel_on_call.borrow_mut() = Some((n, token));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn sign_outs(&self) -> u32 {
        self.sign_outs.get()
    }

    fn serve(&self, call: Call) -> Result<HttpResponse> {
        self.calls.borrow_mut().push(call);
        let n = self.calls.borrow().len();
        if let Some((at, token)) = self.cancel_on_call.borrow().as_ref() {
            if *at == n {
                token.cancel();
            }
        }
        let reply = self
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match reply {
            Reply::Respond(response) => Ok(response),
            Reply::NetworkDown => Err(VerifyError::Transient("Network error.".to_string())),
        }
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, path: &str) -> Result<HttpResponse> {
        self.serve(Call {
            method: "GET",
            path: path.to_string(),
            body: None,
        })
    }

    fn put_json(&self, path: &str, body: &Value) -> Result<HttpResponse> {
        self.serve(Call {
            method: "PUT",
            path: path.to_string(),
            body: Some(body.clone()),
        })
    }

    fn sign_out(&self) {
        self.sign_outs.set(self.sign_outs.get() + 1);
    }
}
