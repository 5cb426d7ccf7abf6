#![allow(dead_code)]

use weld::prelude::*;

pub struct Listener;

#[component]
impl Listener {
    #[inject]
    pub fn new(#[nullable] #[provider] port: Option<u16>) -> Self {
        let _ = port;
        Self
    }
}

fn main() {}
