// Reading the ranks from an Excel workbook.
// The layout is the same as for CSV files: a header row with the candidates, then
// one row per ballot.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::rcv::{
    io_common::{candidate_name, first_vote_column, make_default_id},
    *,
};

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => format!("{}", f),
        DataType::Int(i) => format!("{}", i),
        DataType::Empty => "".to_string(),
        x => format!("{:?}", x),
    }
}

pub fn read_xlsx_ranking(
    path: &str,
    timestamp_column_present: bool,
    worksheet_name: Option<&str>,
) -> RcvResult<ParsedSheet> {
    let default_id = make_default_id(path);
    let choices_start_col = first_vote_column(timestamp_column_present);

    let wrange = get_range(path, worksheet_name)?;
    // Excel rows are numbered from 1.
    let first_row = wrange.start().map(|(r, _)| r as usize + 1).unwrap_or(1);

    let mut rows = wrange.rows();
    let header = rows.next().context(MissingHeaderSnafu { path })?;
    let candidates: Vec<String> = header
        .iter()
        .skip(choices_start_col)
        .map(|c| candidate_name(&cell_to_string(c)))
        .collect();
    debug!("read_xlsx_ranking: header: {:?}", candidates);

    let mut ballots: Vec<ParsedBallot> = Vec::new();
    for (idx, row) in rows.enumerate() {
        let lineno = first_row + idx + 1;
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let ranks: Vec<String> = cells.into_iter().skip(choices_start_col).collect();
        debug!("read_xlsx_ranking: lineno: {:?} row: {:?}", lineno, &ranks);
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

fn get_range(path: &str, worksheet_name: Option<&str>) -> RcvResult<calamine::Range<DataType>> {
    debug!(
        "read_xlsx_ranking: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    let range_o = match worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?,
    };
    range_o.context(OpeningExcelSnafu { path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(cell_to_string(&DataType::Float(2.0)), "2");
        assert_eq!(cell_to_string(&DataType::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&DataType::Int(3)), "3");
        assert_eq!(cell_to_string(&DataType::Empty), "");
        assert_eq!(
            cell_to_string(&DataType::String("Alice".to_string())),
            "Alice"
        );
    }

    fn data_path(name: &str) -> String {
        format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn ranks(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reads_first_worksheet() {
        let sheet = read_xlsx_ranking(&data_path("forms_export.xlsx"), true, None).unwrap();
        assert_eq!(sheet.candidates, vec!["Alice", "Bob", "Charlie"]);
        // Row 3 is empty.
        let linenos: Vec<usize> = sheet.ballots.iter().map(|pb| pb.lineno).collect();
        assert_eq!(linenos, vec![2, 4, 5]);
        assert_eq!(
            sheet.ballots[0],
            ParsedBallot {
                id: "forms_export.xlsx:2".to_string(),
                lineno: 2,
                ranks: ranks(&["1", "2", "3"]),
            }
        );
        assert_eq!(sheet.ballots[2].ranks, ranks(&["3", "1", "2"]));
    }

    #[test]
    fn named_worksheet() {
        let sheet =
            read_xlsx_ranking(&data_path("forms_export.xlsx"), true, Some("Responses")).unwrap();
        assert_eq!(sheet.ballots.len(), 3);
    }

    #[test]
    fn table_away_from_the_corner() {
        // The table of this worksheet starts at B3.
        let sheet =
            read_xlsx_ranking(&data_path("forms_export.xlsx"), false, Some("Shifted")).unwrap();
        assert_eq!(sheet.candidates, vec!["X", "Y", "Z"]);
        assert_eq!(
            sheet.ballots,
            vec![ParsedBallot {
                id: "forms_export.xlsx:4".to_string(),
                lineno: 4,
                ranks: ranks(&["2", "3", "1"]),
            }]
        );
    }

    #[test]
    fn missing_worksheet() {
        assert!(matches!(
            read_xlsx_ranking(&data_path("forms_export.xlsx"), true, Some("Sheet9")),
            Err(RcvError::MissingWorksheet { .. })
        ));
    }

    #[test]
    fn missing_workbook() {
        assert!(matches!(
            read_xlsx_ranking("/no/such/file.xlsx", true, None),
            Err(RcvError::OpeningExcel { .. })
        ));
    }
}
