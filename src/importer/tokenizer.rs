// ==========================================
// 库存管理系统 - 分隔符切分器
// ==========================================
// 职责: 按分隔符把文本切成行 / 语句 / 字段，引号内的分隔符不切分
// 规则:
// - ' 或 " 开启引号，只有相同字符才能关闭
// - 输入末尾总是结束最后一段（无需尾随分隔符）
// - 未闭合的引号使剩余文本全部视为“引号内”
// ==========================================

/// 原始切分段
struct Span<'a> {
    content: &'a str,
    delimiter: Option<char>,
}

fn is_quote(ch: char) -> bool {
    ch == '\'' || ch == '"'
}

fn scan<'a>(text: &'a str, delimiters: &[char]) -> Vec<Span<'a>> {
    let mut spans = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        match quote {
            Some(open) => {
                if ch == open {
                    quote = None;
                }
            }
            None if is_quote(ch) => quote = Some(ch),
            None if delimiters.contains(&ch) => {
                spans.push(Span {
                    content: &text[start..idx],
                    delimiter: Some(ch),
                });
                start = idx + ch.len_utf8();
            }
            None => {}
        }
    }

    if start < text.len() {
        spans.push(Span {
            content: &text[start..],
            delimiter: None,
        });
    }

    spans
}

/// 按分隔符切分文本（行 / 语句）
///
/// # 参数
/// - text: 原始文本
/// - delimiters: 分隔符集合
/// - remove_delimiter: 是否从返回段中去掉分隔符（否则附在段尾）
///
/// # 返回
/// - 有序的文本段；空段与仅含分隔符的段被丢弃
pub fn split_boundaries(text: &str, delimiters: &[char], remove_delimiter: bool) -> Vec<String> {
    scan(text, delimiters)
        .into_iter()
        .map(|span| {
            let mut part = span.content.to_string();
            if !remove_delimiter {
                if let Some(d) = span.delimiter {
                    part.push(d);
                }
            }
            part
        })
        .filter(|part| !part.is_empty() && !part.chars().all(|c| delimiters.contains(&c)))
        .collect()
}

/// 把一行切分为字段
///
/// 与 `split_boundaries` 使用同一扫描规则，但保留空字段：
/// 字段位置有意义，`a,,b` 为三个字段，`a,b,` 的末尾为空字段。
pub fn split_fields(row: &str, delimiters: &[char]) -> Vec<String> {
    let spans = scan(row, delimiters);
    let trailing_delimiter = spans.last().map(|s| s.delimiter.is_some()).unwrap_or(false);

    let mut fields: Vec<String> = spans.into_iter().map(|s| s.content.to_string()).collect();
    if trailing_delimiter {
        fields.push(String::new());
    }
    fields
}

/// 去引号后的单元格
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// 原文是否带引号（带引号的 "null" 是字符串而非空值）
    pub quoted: bool,
}

/// 去掉包裹的引号并解码转义
///
/// # 规则
/// - 去除首尾空白
/// - SQL 的 N'...' 前缀视为普通单引号字符串
/// - 成对引号内的重复引号（'' 或 ""）折叠为一个
/// - 字面量 \r \n \t 解码为控制字符
pub fn unquote(raw: &str) -> Cell {
    let trimmed = raw.trim();
    let body = match trimmed.strip_prefix('N').or_else(|| trimmed.strip_prefix('n')) {
        Some(rest) if rest.len() >= 2 && rest.starts_with('\'') && rest.ends_with('\'') => rest,
        _ => trimmed,
    };

    if body.len() >= 2 {
        let first = body.chars().next();
        let last = body.chars().last();
        if let (Some(open), Some(close)) = (first, last) {
            if open == close && is_quote(open) {
                let inner = &body[1..body.len() - 1];
                let doubled: String = [open, open].iter().collect();
                let collapsed = inner.replace(&doubled, &open.to_string());
                return Cell {
                    text: decode_escapes(&collapsed),
                    quoted: true,
                };
            }
        }
    }

    Cell {
        text: trimmed.to_string(),
        quoted: false,
    }
}

/// 字面量 \\ \r \n \t → 反斜杠 / 控制字符（其它反斜杠序列原样保留）
pub fn decode_escapes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            let decoded = match chars.peek() {
                Some('\\') => Some('\\'),
                Some('r') => Some('\r'),
                Some('n') => Some('\n'),
                Some('t') => Some('\t'),
                _ => None,
            };
            if let Some(d) = decoded {
                out.push(d);
                chars.next();
                continue;
            }
        }
        out.push(ch);
    }

    out
}

/// 反斜杠 / 控制字符 → 字面量 \\ \r \n \t（导出时使用，与 decode_escapes 对应）
pub fn encode_escapes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// 查找从 `from` 起第一个括号组（引号内的括号不计）
///
/// # 返回
/// - Some((open, close)): 左右括号的字节位置
/// - None: 没有左括号，或括号不平衡
pub fn find_balanced_group(text: &str, from: usize) -> Option<(usize, usize)> {
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut open_at = None;

    for (idx, ch) in text.get(from..)?.char_indices() {
        let pos = from + idx;
        match quote {
            Some(open) => {
                if ch == open {
                    quote = None;
                }
            }
            None if is_quote(ch) => {
                // 括号组之外的引号不影响查找
                if open_at.is_some() {
                    quote = Some(ch);
                }
            }
            None if ch == '(' => {
                if open_at.is_none() {
                    open_at = Some(pos);
                }
                depth += 1;
            }
            None if ch == ')' => {
                if open_at.is_none() {
                    return None;
                }
                depth -= 1;
                if depth == 0 {
                    return open_at.map(|open| (open, pos));
                }
            }
            None => {}
        }
    }

    None
}
