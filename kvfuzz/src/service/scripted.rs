use std::{cell::RefCell, collections::VecDeque, io};

use reqwest::StatusCode;
use serde_json::{Value, json};

use super::{KeyValueService, ServiceError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { key: String, value: String },
    Read(String),
    Modify { key: String, value: String },
    Delete(String),
    List,
}

impl Call {
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Create { key, .. }
            | Self::Read(key)
            | Self::Modify { key, .. }
            | Self::Delete(key) => Some(key),
            Self::List => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Reply {
    Ok,
    Status(u16),
    Transport,
    Value(Value),
    Listing(Vec<String>),
}

/// A service that answers from a queue of canned replies and records every call it gets.
/// Once the queue runs dry, every call succeeds.
#[derive(Debug, Default)]
pub struct ScriptedService {
    replies: RefCell<VecDeque<Reply>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into_iter().collect()),
            calls: RefCell::default(),
        }
    }

    pub fn push_reply(&self, reply: Reply) {
        self.replies.borrow_mut().push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn answer(&self, call: Call) -> Result<Reply, ServiceError> {
        self.calls.borrow_mut().push(call);

        match self.replies.borrow_mut().pop_front().unwrap_or(Reply::Ok) {
            Reply::Status(code) => Err(ServiceError::Status(
                StatusCode::from_u16(code).expect("scripted status codes are valid"),
            )),
            Reply::Transport => Err(ServiceError::Transport(Box::new(io::Error::from(
                io::ErrorKind::ConnectionRefused,
            )))),
            reply => Ok(reply),
        }
    }
}

impl KeyValueService for ScriptedService {
    async fn create(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        self.answer(Call::Create {
            key: key.to_string(),
            value: value.to_string(),
        })
        .map(|_| ())
    }

    async fn read(&self, key: &str) -> Result<Value, ServiceError> {
        match self.answer(Call::Read(key.to_string()))? {
            Reply::Value(value) => Ok(value),
            _ => Ok(json!({ "valkey": "scripted", "cassandra": "scripted" })),
        }
    }

    async fn modify(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        self.answer(Call::Modify {
            key: key.to_string(),
            value: value.to_string(),
        })
        .map(|_| ())
    }

    async fn delete(&self, key: &str) -> Result<(), ServiceError> {
        self.answer(Call::Delete(key.to_string())).map(|_| ())
    }

    async fn list(&self) -> Result<Vec<String>, ServiceError> {
        match self.answer(Call::List)? {
            Reply::Listing(keys) => Ok(keys),
            _ => Ok(vec![]),
        }
    }
}
