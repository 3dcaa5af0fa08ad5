use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to parse immediate '{0}'")]
pub struct ImmediateError(pub String);

/// Parses decimal, `0x` hexadecimal, `0b` binary, or `'c'` character literals
pub fn parse_imm_u32(arg: &str) -> Result<u32, ImmediateError> {
    let err = || ImmediateError(arg.to_string());

    if let Some(c) = arg.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        return parse_char(c).ok_or_else(err);
    }

    let res = if let Some(hex) = arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        u32::from_str_radix(&hex.replace('_', ""), 16)
    } else if let Some(bin) = arg.strip_prefix("0b").or_else(|| arg.strip_prefix("0B")) {
        u32::from_str_radix(&bin.replace('_', ""), 2)
    } else {
        arg.replace('_', "").parse::<u32>()
    };

    res.map_err(|_| err())
}

fn parse_char(s: &str) -> Option<u32> {
    let mut chars = s.chars();
    let c = match (chars.next()?, chars.next(), chars.next()) {
        ('\\', Some(e), None) => match e {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            _ => return None,
        },
        (c, None, None) => c,
        _ => return None,
    };

    c.is_ascii().then_some(c as u32)
}
