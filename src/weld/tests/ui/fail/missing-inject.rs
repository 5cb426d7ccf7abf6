#![allow(dead_code)]

use weld::prelude::*;

pub struct Clock;

#[component]
impl Clock {
    pub fn new() -> Self {
        Self
    }
}

fn main() {}
