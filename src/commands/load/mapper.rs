use crate::model::Record;

type FieldSetter = fn(&mut Record, &str);

/// Recognized export columns and the record field each one fills.
const FIELD_SETTERS: &[(&str, FieldSetter)] = &[
    ("pub", |record, value| record.r#pub = value.to_string()),
    ("title", |record, value| record.title = value.to_string()),
    ("page", |record, value| {
        record.page = value.to_string();
        record.page_count = page_count(value);
    }),
    ("author", |record, value| record.author = value.to_string()),
    ("creator", |record, value| record.creator = value.to_string()),
    ("author_name", |record, value| {
        record.author_name = value.to_string()
    }),
    ("ordinal", |record, value| record.ordinal = value.to_string()),
    ("stream", |record, value| record.stream = value.to_string()),
    ("stream_name", |record, value| {
        record.stream_name = value.to_string()
    }),
    ("affiliation", |record, value| {
        record.affiliation = value.to_string()
    }),
];

fn setter_for(column: &str) -> Option<FieldSetter> {
    let name = column.strip_prefix('?').unwrap_or(column);
    FIELD_SETTERS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, setter)| *setter)
}

/// Positional mapping resolved once from the header line.
#[derive(Clone)]
pub struct HeaderMapping {
    columns: Vec<String>,
    setters: Vec<Option<FieldSetter>>,
}

impl HeaderMapping {
    pub fn from_header_line(line: &str) -> Self {
        let columns: Vec<String> = line.split('\t').map(ToOwned::to_owned).collect();
        let setters = columns.iter().map(|column| setter_for(column)).collect();
        Self { columns, setters }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn recognized_count(&self) -> usize {
        self.setters.iter().filter(|setter| setter.is_some()).count()
    }

    /// Builds a record from one data line. Never fails: missing columns keep
    /// their defaults and columns past the header are ignored.
    pub fn map_line(&self, line: &str, source: &str) -> Record {
        let mut record = Record::new(source);
        for (field, setter) in line.split('\t').zip(&self.setters) {
            if let Some(setter) = setter {
                setter(&mut record, trim_quotes(field));
            }
        }
        record
    }
}

/// Removes exactly one pair of surrounding double quotes.
pub fn trim_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Number of pages covered by a pagination string.
///
/// Handles plain ranges (`361-363`), article-number ranges (`88:1-88:24`) and
/// single pages (`50`). Anything else counts as zero.
pub fn page_count(page: &str) -> i64 {
    let span = if page.contains('-') && !page.contains(':') {
        split_pair(page, '-')
            .and_then(|(start, end)| Some((start.parse::<i64>().ok()?, end.parse::<i64>().ok()?)))
    } else if page.contains(':') {
        split_pair(page, '-')
            .and_then(|(start, end)| Some((article_page(start)?, article_page(end)?)))
    } else if page.parse::<i64>().is_ok() {
        return 1;
    } else {
        None
    };

    span.and_then(|(start, end)| end.checked_sub(start)?.checked_add(1))
        .unwrap_or(0)
}

/// Splits on `sep` only when it occurs exactly once.
fn split_pair(value: &str, sep: char) -> Option<(&str, &str)> {
    let (head, tail) = value.split_once(sep)?;
    if tail.contains(sep) {
        return None;
    }
    Some((head, tail))
}

fn article_page(part: &str) -> Option<i64> {
    let (_, page) = split_pair(part, ':')?;
    page.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "?pub\t?title\t?page\t?author\t?creator\t?author_name\t?ordinal\t?stream\t?stream_name\t?affiliation";

    #[test]
    fn page_count_table() {
        let cases = [
            ("361-363", 3),
            ("88:1-88:24", 24),
            ("50", 1),
            ("", 0),
            ("12-", 0),
            ("abc", 0),
            ("1-2-3", 0),
            ("88:1-24", 0),
            ("88:1:2-88:3", 0),
            ("iii-x", 0),
            ("7-7", 1),
            ("5--3", 0),
            ("88:1--88:3", 0),
            ("0-9223372036854775807", 0),
            ("1:0-1:9223372036854775807", 0),
            ("-9223372036854775808-9223372036854775807", 0),
        ];
        for (page, expected) in cases {
            assert_eq!(page_count(page), expected, "page {page:?}");
        }
    }

    #[test]
    fn trim_quotes_strips_one_pair_only() {
        assert_eq!(trim_quotes("\"foo\""), "foo");
        assert_eq!(trim_quotes("foo"), "foo");
        assert_eq!(trim_quotes("\""), "\"");
        assert_eq!(trim_quotes("\"foo"), "\"foo");
        assert_eq!(trim_quotes("\"\""), "");
        assert_eq!(trim_quotes("\"\"foo\"\""), "\"foo\"");
    }

    #[test]
    fn maps_every_recognized_column() {
        let mapping = HeaderMapping::from_header_line(HEADER);
        assert_eq!(mapping.recognized_count(), 10);

        let line = "\"https://dblp.org/rec/conf/chi/X23\"\t\"A Title\"\t\"361-363\"\t\"a\"\t\"c\"\t\"Jane Doe\"\t\"1\"\t\"https://dblp.org/streams/conf/chi\"\t\"CHI\"\t\"Somewhere\"";
        let record = mapping.map_line(line, "dblp/x.tsv");

        assert_eq!(record.r#pub, "https://dblp.org/rec/conf/chi/X23");
        assert_eq!(record.title, "A Title");
        assert_eq!(record.page, "361-363");
        assert_eq!(record.page_count, 3);
        assert_eq!(record.author, "a");
        assert_eq!(record.creator, "c");
        assert_eq!(record.author_name, "Jane Doe");
        assert_eq!(record.ordinal, "1");
        assert_eq!(record.stream, "https://dblp.org/streams/conf/chi");
        assert_eq!(record.stream_name, "CHI");
        assert_eq!(record.affiliation, "Somewhere");
        assert_eq!(record.source, "dblp/x.tsv");
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn short_line_leaves_trailing_defaults() {
        let mapping = HeaderMapping::from_header_line(HEADER);
        let record = mapping.map_line("p1\tTitle", "src");

        assert_eq!(record.r#pub, "p1");
        assert_eq!(record.title, "Title");
        assert_eq!(record.page, "");
        assert_eq!(record.page_count, 0);
        assert_eq!(record.affiliation, "");
    }

    #[test]
    fn extra_fields_and_unknown_columns_are_ignored() {
        let mapping = HeaderMapping::from_header_line("?title\t?unknown\tpage");
        assert_eq!(mapping.recognized_count(), 2);

        let record = mapping.map_line("T\tignored\t50\textra\tmore", "src");
        assert_eq!(record.title, "T");
        assert_eq!(record.page, "50");
        assert_eq!(record.page_count, 1);
    }

    #[test]
    fn oversized_page_range_maps_to_zero() {
        let mapping = HeaderMapping::from_header_line("?page");
        let record = mapping.map_line("1:0-1:9223372036854775807", "src");

        assert_eq!(record.page, "1:0-1:9223372036854775807");
        assert_eq!(record.page_count, 0);
    }

    #[test]
    fn each_mapped_record_gets_a_fresh_id() {
        let mapping = HeaderMapping::from_header_line(HEADER);
        let first = mapping.map_line("p", "src");
        let second = mapping.map_line("p", "src");
        assert_ne!(first.id, second.id);
    }
}
