#![allow(dead_code)]

use weld::prelude::*;

pub struct Cache;

#[component]
impl Cache {
    #[inject]
    pub fn new(#[nullable] capacity: usize) -> Self {
        let _ = capacity;
        Self
    }
}

fn main() {}
