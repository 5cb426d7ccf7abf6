#![allow(dead_code)]

use weld::prelude::*;

pub struct Session;

#[component]
impl Session {
    #[inject]
    pub fn new() -> Self {
        Self
    }

    #[inject]
    pub fn close(self) {}
}

fn main() {}
