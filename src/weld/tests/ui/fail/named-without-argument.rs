#![allow(dead_code)]

use weld::prelude::*;

pub struct Mailer;

#[component]
impl Mailer {
    #[inject]
    pub fn new(#[named] relay: String) -> Self {
        let _ = relay;
        Self
    }
}

fn main() {}
