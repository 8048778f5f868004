use anyhow::{anyhow, Result};
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqRecord {
    pub name: String,
    pub seq: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Fasta,
    Fastq,
}

/// FASTA / FASTQ 记录读取器，格式由第一条记录的首字符（'>' 或 '@'）决定。
///
/// FASTA 支持多行序列；FASTQ 要求四行一条记录。碱基统一转为大写，空白被丢弃。
pub struct SeqReader<R: BufRead> {
    reader: R,
    buf: String,
    format: Option<Format>,
    peek_header: Option<String>,
    done: bool,
}

impl<R: BufRead> SeqReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            format: None,
            peek_header: None,
            done: false,
        }
    }

    pub fn next_record(&mut self) -> Result<Option<SeqRecord>> {
        if self.done {
            return Ok(None);
        }

        let header = match self.peek_header.take() {
            Some(h) => h,
            None => match self.next_header()? {
                Some(h) => h,
                None => {
                    self.done = true;
                    return Ok(None);
                }
            },
        };
        let name = header.split_whitespace().next().unwrap_or("").to_string();

        match self.format {
            Some(Format::Fastq) => self.read_fastq_body(name).map(Some),
            _ => self.read_fasta_body(name).map(Some),
        }
    }

    /// 跳过空行找到第一条记录的头，同时确定文件格式
    fn next_header(&mut self) -> Result<Option<String>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            let line = self.buf.trim_end();
            if line.is_empty() {
                continue;
            }
            let fmt = match line.as_bytes()[0] {
                b'>' => Format::Fasta,
                b'@' => Format::Fastq,
                _ => return Err(anyhow!("expected a '>' or '@' record header, found: {}", line)),
            };
            if let Some(prev) = self.format {
                if prev != fmt {
                    return Err(anyhow!("mixed FASTA/FASTQ records in one input"));
                }
            }
            self.format = Some(fmt);
            return Ok(Some(line[1..].trim().to_string()));
        }
    }

    fn read_fasta_body(&mut self, name: String) -> Result<SeqRecord> {
        let mut seq: Vec<u8> = Vec::new();
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                self.done = true;
                break;
            }
            if self.buf.starts_with('>') {
                self.peek_header = Some(self.buf[1..].trim().to_string());
                break;
            }
            push_bases(&mut seq, &self.buf);
        }
        Ok(SeqRecord { name, seq })
    }

    fn read_fastq_body(&mut self, name: String) -> Result<SeqRecord> {
        // sequence line
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Err(anyhow!("unexpected EOF after header of '{}'", name));
        }
        let mut seq = Vec::new();
        push_bases(&mut seq, &self.buf);

        // plus line
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 || !self.buf.starts_with('+') {
            return Err(anyhow!("missing '+' line in record '{}'", name));
        }

        // quality line, only checked for length
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Err(anyhow!("missing quality line in record '{}'", name));
        }
        if self.buf.trim_end().len() != seq.len() {
            return Err(anyhow!("seq/qual length mismatch in record '{}'", name));
        }

        Ok(SeqRecord { name, seq })
    }
}

fn push_bases(seq: &mut Vec<u8>, line: &str) {
    for &b in line.as_bytes() {
        match b {
            b'\n' | b'\r' | b' ' | b'\t' => {}
            _ => seq.push(b.to_ascii_uppercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(data: &[u8]) -> Result<Vec<SeqRecord>> {
        let mut r = SeqReader::new(Cursor::new(data));
        let mut out = Vec::new();
        while let Some(rec) = r.next_record()? {
            out.push(rec);
        }
        Ok(out)
    }

    #[test]
    fn parse_multiline_fasta() {
        let recs = read_all(b">read1 first\nACgT\nNN\n>read2\nAAA\n").unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].name, "read1");
        assert_eq!(recs[0].seq, b"ACGTNN");
        assert_eq!(recs[1].name, "read2");
        assert_eq!(recs[1].seq, b"AAA");
    }

    #[test]
    fn parse_fasta_with_crlf_and_leading_blank_lines() {
        let recs = read_all(b"\n\n>chr1 desc\r\nAC g t\r\n acgt\r\n").unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].seq, b"ACGTACGT");
    }

    #[test]
    fn parse_fastq() {
        let recs = read_all(b"@q1 x\nACGT\n+\nIIII\n@q2\nGG\n+q2\n!!\n").unwrap();
        assert_eq!(
            recs,
            vec![
                SeqRecord { name: "q1".into(), seq: b"ACGT".to_vec() },
                SeqRecord { name: "q2".into(), seq: b"GG".to_vec() },
            ]
        );
    }

    #[test]
    fn fastq_errors() {
        assert!(read_all(b"@q1\nACGT\n+\nIII\n").is_err());
        assert!(read_all(b"@q1\nACGT\nIIII\n").is_err());
        assert!(read_all(b"@q1\n").is_err());
    }

    #[test]
    fn rejects_garbage_and_mixed_formats() {
        assert!(read_all(b"ACGT\n").is_err());
        assert!(read_all(b"@q1\nAC\n+\nII\n>r\nAC\n").is_err());
    }

    #[test]
    fn empty_input() {
        assert!(read_all(b"").unwrap().is_empty());
        assert!(read_all(b"\n\n").unwrap().is_empty());
    }
}
