// Primitives for reading CSV files.

use crate::rcv::{
    io_common::{candidate_name, first_vote_column, make_default_id},
    *,
};

/// Reads a grid of ranks exported from a forms tool.
///
/// The first line is the header with the names of the candidates. Each following
/// line is a ballot with one rank per candidate. Lines that are entirely empty are
/// skipped.
pub fn read_csv_ranking(path: &str, timestamp_column_present: bool) -> RcvResult<ParsedSheet> {
    let default_id = make_default_id(path);
    let choices_start_col = first_vote_column(timestamp_column_present);

    let contents = fs::read(path)
        .map_err(csv::Error::from)
        .context(CsvOpenSnafu { path })?;
    let mut lines = LineCounter::new(&contents);
    let mut records = get_records(&contents);
    let header = match records.next() {
        Some(line_r) => line_r.context(CsvLineParseSnafu { lineno: 1_usize })?,
        None => return MissingHeaderSnafu { path }.fail(),
    };
    let candidates: Vec<String> = header
        .iter()
        .skip(choices_start_col)
        .map(candidate_name)
        .collect();
    debug!("read_csv_ranking: candidates: {:?}", candidates);

    let mut ballots: Vec<ParsedBallot> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is on line 1.
        let line = line_r.context(CsvLineParseSnafu { lineno: idx + 2 })?;
        // The reader drops blank lines without counting them: the line number comes
        // from the byte offset of the record.
        let lineno = match line.position() {
            Some(pos) => lines.line_at(pos.byte() as usize),
            None => idx + 2,
        };
        if line.iter().all(|cell| cell.trim().is_empty()) {
            debug!("read_csv_ranking: skipping empty line {}", lineno);
            continue;
        }
        let ranks: Vec<String> = line
            .iter()
            .skip(choices_start_col)
            .map(|s| s.to_string())
            .collect();
        debug!("read_csv_ranking: lineno: {:?} row: {:?}", lineno, &ranks);
        ballots.push(ParsedBallot {
            id: default_id(lineno),
            lineno,
            ranks,
        });
    }
    Ok(ParsedSheet {
        candidates,
        ballots,
    })
}

fn get_records(contents: &[u8]) -> csv::StringRecordsIntoIter<&[u8]> {
    // Rows of the wrong length are kept here and rejected as malformed ballots.
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(contents)
        .into_records()
}

/// Maps byte offsets to line numbers (starting at 1).
/// The offsets must be queried in increasing order.
struct LineCounter<'a> {
    contents: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(contents: &'a [u8]) -> LineCounter<'a> {
        LineCounter {
            contents,
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, byte: usize) -> usize {
        let end = byte.min(self.contents.len());
        if end > self.offset {
            self.line += self.contents[self.offset..end]
                .iter()
                .filter(|b| **b == b'\n')
                .count();
            self.offset = end;
        }
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_path(name: &str) -> String {
        format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    #[test]
    fn reads_header_and_rows() {
        let sheet = read_csv_ranking(&data_path("forms_export.csv"), true).unwrap();
        assert_eq!(sheet.candidates, vec!["Alice", "Bob", "Charlie"]);
        assert_eq!(sheet.ballots.len(), 5);
        assert_eq!(
            sheet.ballots[0],
            ParsedBallot {
                id: "forms_export.csv:2".to_string(),
                lineno: 2,
                ranks: vec!["1".to_string(), "2".to_string(), "3".to_string()],
            }
        );
    }

    #[test]
    fn without_timestamp() {
        let sheet = read_csv_ranking(&data_path("tie.csv"), false).unwrap();
        assert_eq!(sheet.candidates, vec!["X", "Y", "Z"]);
        assert_eq!(sheet.ballots.len(), 3);
    }

    #[test]
    fn empty_lines_are_skipped() {
        let sheet = read_csv_ranking(&data_path("malformed.csv"), true).unwrap();
        let linenos: Vec<usize> = sheet.ballots.iter().map(|pb| pb.lineno).collect();
        assert_eq!(linenos, vec![2, 3, 6]);
    }

    #[test]
    fn line_numbers_from_offsets() {
        let contents = b"a,b\r\n1,2\n\n\n3,4\n";
        let mut lines = LineCounter::new(contents);
        assert_eq!(lines.line_at(0), 1);
        assert_eq!(lines.line_at(5), 2);
        assert_eq!(lines.line_at(11), 5);
        assert_eq!(lines.line_at(100), 6);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_csv_ranking(&data_path("no_such_file.csv"), true),
            Err(RcvError::CsvOpen { .. })
        ));
    }
}
