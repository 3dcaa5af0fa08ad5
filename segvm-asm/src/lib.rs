mod immediate;
pub mod instructions;

use core::fmt;
use std::{
    collections::HashMap,
    sync::{Arc, LazyLock},
};

use regex::Regex;
use thiserror::Error;

use segvm::cpu::{Instruction, InstructionError, Opcode, RegisterError};

pub use immediate::{parse_imm_u32, ImmediateError};
use instructions::{encode, resolve_value};

static LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

static REGISTER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[rR][0-9]+$").unwrap());

pub fn is_valid_label(s: &str) -> bool {
    LABEL_REGEX.is_match(s) && !REGISTER_REGEX.is_match(s)
}

#[derive(Debug, Clone, Error)]
pub enum AssemblerError {
    #[error("Unknown Label {0}")]
    UnknownLabel(String),
    #[error("Unknown Instruction {0}")]
    UnknownInstruction(String),
    #[error("Argument Count Expected {1}, found {0}")]
    ArgumentCountMismatch(usize, usize),
    #[error("Register Error => {0}")]
    Register(#[from] RegisterError),
    #[error("Immediate Error => {0}")]
    Immediate(#[from] ImmediateError),
    #[error("Bad Label '{0}'")]
    BadLabel(String),
    #[error("Duplicate Label '{0}'")]
    DuplicateLabel(String),
    #[error("Instruction Error => {0}")]
    Instruction(#[from] InstructionError),
    #[error("Parser Error - {0}")]
    Parser(#[from] ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Parser ended within a character literal")]
    WithinQuote,
}

#[derive(Debug, Default, Clone)]
pub struct LocationInfo {
    pub line: usize,
    pub text: Option<Arc<str>>,
}

impl fmt::Display for LocationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.line)?;
        if let Some(txt) = &self.text {
            write!(f, " {}", txt)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssemblerErrorLoc {
    pub err: AssemblerError,
    pub loc: LocationInfo,
}

impl fmt::Display for AssemblerErrorLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {} - {}", self.loc.line, self.err)?;
        if let Some(s) = self.loc.text.as_ref() {
            write!(f, " - \"{}\"", s.trim())?;
        }

        Ok(())
    }
}

impl std::error::Error for AssemblerErrorLoc {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmToken {
    Operation(Opcode, Vec<String>),
    Word(String),
    CreateLabel(String),
    Empty,
}

impl AsmToken {
    fn trim_line(line: &str) -> &str {
        let s = line.trim();
        if let Some(ind) = Self::comment_start(s) {
            &s[..ind]
        } else {
            s
        }
    }

    /// Finds the first `;` that is not inside a character literal
    fn comment_start(s: &str) -> Option<usize> {
        let mut within_quote = false;
        let mut is_escape = false;

        for (i, c) in s.char_indices() {
            if within_quote {
                if is_escape {
                    is_escape = false;
                } else if c == '\\' {
                    is_escape = true;
                } else if c == '\'' {
                    within_quote = false;
                }
            } else if c == '\'' {
                within_quote = true;
            } else if c == ';' {
                return Some(i);
            }
        }

        None
    }

    /// Splits on whitespace and commas, keeping character literals whole
    fn split_asm_delim(s: &str) -> Result<Vec<String>, ParseError> {
        let mut within_quote = false;
        let mut is_escape = false;

        let mut so_far = String::new();
        let mut words = Vec::new();

        for c in s.chars() {
            if within_quote {
                so_far.push(c);
                if is_escape {
                    is_escape = false;
                } else if c == '\\' {
                    is_escape = true;
                } else if c == '\'' {
                    within_quote = false;
                }
            } else if c == '\'' {
                within_quote = true;
                so_far.push(c);
            } else if c.is_whitespace() || c == ',' {
                if !so_far.is_empty() {
                    words.push(std::mem::take(&mut so_far));
                }
            } else {
                so_far.push(c);
            }
        }

        if within_quote {
            return Err(ParseError::WithinQuote);
        }

        if !so_far.is_empty() {
            words.push(so_far);
        }

        Ok(words)
    }
}

impl TryFrom<&str> for AsmToken {
    type Error = AssemblerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let s = Self::trim_line(value);
        let words = Self::split_asm_delim(s)?;

        let first: &str = if let Some(w) = words.first() {
            w
        } else {
            return Ok(Self::Empty);
        };

        let tok = if let Some(directive) = first.strip_prefix('.') {
            match directive {
                "word" if words.len() == 2 => Self::Word(words[1].clone()),
                "word" => return Err(Self::Error::ArgumentCountMismatch(words.len() - 1, 1)),
                _ => return Err(Self::Error::UnknownInstruction(first.to_string())),
            }
        } else if let Some(lbl) = first.strip_prefix(':') {
            if !is_valid_label(lbl) {
                return Err(Self::Error::BadLabel(lbl.to_string()));
            }

            if words.len() != 1 {
                return Err(Self::Error::ArgumentCountMismatch(words.len() - 1, 0));
            }

            Self::CreateLabel(lbl.to_string())
        } else if let Some(op) = Opcode::from_mnemonic(&first.to_lowercase()) {
            Self::Operation(op, words[1..].to_vec())
        } else {
            return Err(Self::Error::UnknownInstruction(first.to_string()));
        };

        Ok(tok)
    }
}

impl fmt::Display for AsmToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operation(op, args) => {
                write!(f, "{op}")?;
                for a in args {
                    write!(f, " {a}")?;
                }
                Ok(())
            }
            Self::Word(v) => write!(f, ".word {v}"),
            Self::CreateLabel(lbl) => write!(f, ":{lbl}"),
            Self::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AsmTokenLoc {
    pub tok: AsmToken,
    pub loc: LocationInfo,
}

#[derive(Default)]
pub struct TokenList {
    tokens: Vec<AsmTokenLoc>,
}

impl TokenList {
    pub fn parse_line(&mut self, line: &str, loc: LocationInfo) -> Result<(), AssemblerError> {
        self.tokens.push(AsmTokenLoc {
            tok: AsmToken::try_from(line)?,
            loc,
        });
        Ok(())
    }

    /// Assigns label addresses, then encodes every statement into a word
    pub fn to_words(&self) -> Result<Vec<u32>, AssemblerErrorLoc> {
        let labels = self.collect_labels()?;
        let mut words = Vec::new();

        for t in self.tokens.iter() {
            let word = match &t.tok {
                AsmToken::Operation(op, args) => encode(*op, args, &labels).map(u32::from),
                AsmToken::Word(v) => resolve_value(v, &labels),
                AsmToken::CreateLabel(_) | AsmToken::Empty => continue,
            };

            words.push(word.map_err(|err| AssemblerErrorLoc {
                err,
                loc: t.loc.clone(),
            })?);
        }

        Ok(words)
    }

    fn collect_labels(&self) -> Result<HashMap<String, u32>, AssemblerErrorLoc> {
        let mut labels = HashMap::new();
        let mut addr = 0u32;

        for t in self.tokens.iter() {
            match &t.tok {
                AsmToken::CreateLabel(lbl) => {
                    if labels.insert(lbl.clone(), addr).is_some() {
                        return Err(AssemblerErrorLoc {
                            err: AssemblerError::DuplicateLabel(lbl.clone()),
                            loc: t.loc.clone(),
                        });
                    }
                }
                AsmToken::Operation(..) | AsmToken::Word(_) => addr += 1,
                AsmToken::Empty => (),
            }
        }

        Ok(labels)
    }
}

pub fn assemble_text(txt: &str) -> Result<Vec<u32>, AssemblerErrorLoc> {
    assemble_lines(&txt.lines().collect::<Vec<_>>())
}

pub fn assemble_lines(txt: &[&str]) -> Result<Vec<u32>, AssemblerErrorLoc> {
    let mut state = TokenList::default();

    for (i, l) in txt.iter().enumerate() {
        let loc = LocationInfo {
            line: i + 1,
            text: Some(Arc::from(*l)),
        };
        if let Err(e) = state.parse_line(l, loc.clone()) {
            return Err(AssemblerErrorLoc { err: e, loc });
        }
    }

    state.to_words()
}

/// Serializes words as a big-endian program image
pub fn to_program_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

/// Produces one listing line per word with its offset, raw value, and disassembly
pub fn disassemble(words: &[u32]) -> Vec<String> {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| format!("{i:08x}: {w:08x}  {}", Instruction::new(*w)))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    use segvm::{cpu::Processor, device::BufferedDevice, memory::SegmentMemory};

    fn run_program(txt: &str, input: &[u8]) -> Vec<u8> {
        let words = assemble_text(txt).unwrap();
        let mut cpu = Processor::new(SegmentMemory::new(words), BufferedDevice::new(input));
        cpu.run().unwrap();
        cpu.device_mut().take_output()
    }

    #[test]
    fn test_hello() {
        let txt = include_str!("../programs/hello.usm");
        let words = assemble_text(txt).unwrap();
        assert!(!words.is_empty());
        assert_eq!(words[0], 0xD200_0048);
    }

    #[test]
    fn test_echo() {
        let txt = include_str!("../programs/echo.usm");
        let words = assemble_text(txt).unwrap();
        assert_eq!(words.len(), 11);
    }

    #[test]
    fn test_self_load() {
        let txt = include_str!("../programs/self_load.usm");
        assert!(assemble_text(txt).is_ok());
    }

    #[test]
    fn test_run_programs() {
        assert_eq!(
            run_program(include_str!("../programs/hello.usm"), &[]),
            b"Hello\n"
        );
        assert_eq!(
            run_program(include_str!("../programs/echo.usm"), b"segments"),
            b"segments"
        );
        assert_eq!(
            run_program(include_str!("../programs/self_load.usm"), &[]),
            b"K"
        );
    }

    #[test]
    fn test_labels_and_words() {
        let words = assemble_text(
            "
            ; jump over the data word
            lv r1, skip
            loadp r0, r1
            .word 0xDEADBEEF
            :skip
            halt
            .word skip
            ",
        )
        .unwrap();

        assert_eq!(words, vec![0xD200_0003, 0xC000_0001, 0xDEAD_BEEF, 0x7000_0000, 3]);
    }

    #[test]
    fn test_comments_and_characters() {
        let words = assemble_text("lv r2 ';' ; semicolon\nLV r3 ' '").unwrap();
        assert_eq!(words, vec![0xD400_003B, 0xD600_0020]);
    }

    #[test]
    fn test_error_locations() {
        let err = assemble_text("halt\n\nfoo r1").unwrap_err();
        assert_eq!(err.loc.line, 3);
        assert!(matches!(err.err, AssemblerError::UnknownInstruction(_)));

        let err = assemble_text(":a\nhalt\n:a").unwrap_err();
        assert_eq!(err.loc.line, 3);
        assert!(matches!(err.err, AssemblerError::DuplicateLabel(_)));

        let err = assemble_text("lv r1 nowhere").unwrap_err();
        assert!(matches!(err.err, AssemblerError::UnknownLabel(_)));

        let err = assemble_text(":r3").unwrap_err();
        assert!(matches!(err.err, AssemblerError::BadLabel(_)));

        let err = assemble_text("lv r1 'a").unwrap_err();
        assert!(matches!(err.err, AssemblerError::Parser(ParseError::WithinQuote)));

        assert!(err.to_string().starts_with("Line 1 - "));
    }

    #[test]
    fn test_disassemble_listing() {
        let words = assemble_text("lv r1 65\nout r1\nhalt").unwrap();
        let listing = disassemble(&words);
        assert_eq!(
            listing,
            vec![
                "00000000: d2000041  lv r1 65",
                "00000001: a0000001  out r1",
                "00000002: 70000000  halt",
            ]
        );
    }

    #[test]
    fn test_disassembly_reassembles() {
        let words = assemble_text(include_str!("../programs/echo.usm")).unwrap();
        let text = words
            .iter()
            .map(|w| Instruction::new(*w).to_string())
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(assemble_text(&text).unwrap(), words);
    }

    #[test]
    fn test_program_bytes() {
        assert_eq!(
            to_program_bytes(&[0xD200_0041, 0x7000_0000]),
            vec![0xD2, 0x00, 0x00, 0x41, 0x70, 0x00, 0x00, 0x00]
        );
    }
}
