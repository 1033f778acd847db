#![allow(dead_code)]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use cubecloud::prompt::Prompter;
use cubecloud::{CloudError, Result};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;

/// An unsigned JWT carrying `claims`.
pub fn jwt(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(json!({ "alg": "HS256", "typ": "JWT" }).to_string());
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn jwt_for(url: &str) -> String {
    jwt(json!({ "url": url }))
}

/// Answers prompts from a script and records what was asked.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<(String, Vec<String>)>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<(String, Vec<String>)> {
        self.asked.borrow().clone()
    }

    fn next_answer(&self, message: &str, items: &[String]) -> Result<String> {
        self.asked
            .borrow_mut()
            .push((message.to_string(), items.to_vec()));
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| CloudError::Prompt(format!("unexpected prompt: {message}")))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, message: &str) -> Result<String> {
        self.next_answer(message, &[])
    }

    fn select(&self, message: &str, items: &[String]) -> Result<usize> {
        let answer = self.next_answer(message, items)?;
        items
            .iter()
            .position(|item| *item == answer)
            .ok_or_else(|| CloudError::Prompt(format!("{answer} is not one of {items:?}")))
    }
}
