use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use tracing::warn;

use crate::session::{InputSource, Key};

/// Replays a fixed key sequence, one key per tick, then asks to quit.
pub struct ScriptedInput {
    script_commands: Vec<Key>,
    current_command_index: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut script_commands = Vec::new();
        for line in reader.lines() {
            parse_line(&line?, &mut script_commands);
        }
        Ok(Self::from_keys(script_commands))
    }

    pub fn parse(script: &str) -> Self {
        let mut script_commands = Vec::new();
        for line in script.lines() {
            parse_line(line, &mut script_commands);
        }
        Self::from_keys(script_commands)
    }

    pub fn from_keys(script_commands: Vec<Key>) -> Self {
        Self {
            script_commands,
            current_command_index: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.script_commands.len() - self.current_command_index
    }

    pub fn next_key(&mut self) -> Option<Key> {
        let key = self.script_commands.get(self.current_command_index).copied()?;
        self.current_command_index += 1;
        Some(key)
    }
}

impl InputSource for ScriptedInput {
    fn poll_key(&mut self) -> Key {
        self.next_key().unwrap_or(Key::Quit)
    }
}

fn parse_line(line: &str, keys: &mut Vec<Key>) {
    let trimmed_line = line.trim_end_matches(['\r', '\n']);
    if trimmed_line.trim().is_empty() || trimmed_line.trim_start().starts_with('#') {
        return;
    }
    for char_code in trimmed_line.chars() {
        match char_to_key(char_code) {
            Some(key) => keys.push(key),
            None => warn!(key = ?char_code, "unknown key in script"),
        }
    }
}

fn char_to_key(c: char) -> Option<Key> {
    match c {
        'i' | 'I' | 'w' | 'W' => Some(Key::Up),
        'k' | 'K' | 's' | 'S' => Some(Key::Down),
        'j' | 'J' | 'a' | 'A' => Some(Key::Left),
        'l' | 'L' | 'd' | 'D' => Some(Key::Right),
        'f' | 'F' | ' ' => Some(Key::Fire),
        'q' | 'Q' | '\x1B' => Some(Key::Quit),
        '.' => Some(Key::None),
        _ => None,
    }
}
