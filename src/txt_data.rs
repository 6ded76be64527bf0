//! Fixed-width NASR text files (FIX.txt and friends).

use crate::error::Result;
use std::io::prelude::*;
use std::ops::Index;
use std::str::Lines;

#[derive(Debug)]
pub struct DataFile {
    buf: String,
}

impl DataFile {
    pub fn from_reader<B: Read>(reader: &mut B) -> Result<DataFile> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(DataFile {
            buf: String::from_utf8_lossy(&buf).into_owned(),
        })
    }
}

struct Span(usize, usize);

impl DataFile {
    /// Rows whose first column equals `ty`. Each delimiter is a
    /// `(position, length)` pair; the first one must select the row type.
    pub fn rows<'a, 'b>(&'a self, ty: &'b str, delimiters: &'b [(usize, usize)]) -> RowIter<'a, 'b> {
        let delimiters = delimiters.iter().map(|&(p, l)| Span(p, p + l)).collect::<Vec<_>>();
        RowIter {
            lines: self.buf.lines(),
            ty,
            delimiters,
        }
    }
}

pub struct RowIter<'a, 'b> {
    lines: Lines<'a>,
    ty: &'b str,
    delimiters: Vec<Span>,
}

impl<'a, 'b> Iterator for RowIter<'a, 'b> {
    type Item = Row<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        let &Span(l, r) = self.delimiters.first()?;
        loop {
            let line = self.lines.next()?;
            if line.get(l..r) == Some(self.ty) {
                // short lines yield empty trailing fields
                break Some(Row {
                    fields: self
                        .delimiters
                        .iter()
                        .map(|&Span(l, r)| line.get(l..r.min(line.len())).unwrap_or("").trim())
                        .collect::<Vec<_>>(),
                });
            }
        }
    }
}

#[derive(Debug)]
pub struct Row<'a> {
    fields: Vec<&'a str>,
}

impl<'a> Index<usize> for Row<'a> {
    type Output = &'a str;

    fn index(&self, i: usize) -> &Self::Output {
        &self.fields[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_rows_by_type() {
        let text = "FIX1ABCDE\nFIX2XXXXX\nFIX1FGHIJ  \nFIX1K\n";
        let file = DataFile::from_reader(&mut text.as_bytes()).unwrap();
        let rows: Vec<_> = file.rows("FIX1", &[(0, 4), (4, 5)]).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][1], "ABCDE");
        assert_eq!(rows[1][1], "FGHIJ");
        assert_eq!(rows[2][1], "K");
    }
}
