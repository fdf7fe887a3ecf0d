mod basic;
mod members;
mod session;

fn main() {}
