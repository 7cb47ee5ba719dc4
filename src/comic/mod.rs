//! Comic generation — the four-panel pipeline behind the generator page.
//!
//! ARCHITECTURE
//! ============
//! Leaf-first: `panel` (one panel's lifecycle) → `board` (run state plus the
//! four panels) → `generator` (image backend seam) and `notify` (user
//! notices) → `simulator` (drives a run) → `view` (render model and the
//! page's actions). Route handlers only talk to `simulator` and `view`.

pub mod board;
pub mod generator;
pub mod notify;
pub mod panel;
pub mod simulator;
pub mod view;

/// Sample stories offered on the generator page.
pub const EXAMPLE_PROMPTS: [&str; 3] = [
    "一只小猫咪在花园里玩耍，发现了一只蝴蝶，追逐蝴蝶但最终友好相处的故事",
    "办公室里的程序员喝咖啡提神，但是越喝越困，最后趴在键盘上睡着了",
    "小学生第一次骑自行车，从摔倒到最终学会的励志过程",
];
