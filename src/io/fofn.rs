use anyhow::{bail, Context, Result};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// 输入文件类型，按扩展名（大小写不敏感）判断；FASTA / FASTQ 可以带 `.gz` 后缀
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Fasta,
    Fastq,
    Fofn,
}

pub fn input_kind(path: &Path) -> Option<InputKind> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();
    if name.ends_with(".fofn") {
        return Some(InputKind::Fofn);
    }
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    if name.ends_with(".fasta") || name.ends_with(".fa") || name.ends_with(".fna") {
        Some(InputKind::Fasta)
    } else if name.ends_with(".fastq") || name.ends_with(".fq") {
        Some(InputKind::Fastq)
    } else {
        None
    }
}

/// gzip 压缩的输入按 `.gz` 后缀识别
pub fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("gz"))
}

/// 展开输入列表：`.fofn` 文件每行一个路径（空行和 `#` 开头的行忽略），
/// 其余文件必须是 FASTA / FASTQ。FOFN 不递归展开。
pub fn expand_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        let path = input.as_ref();
        match input_kind(path) {
            Some(InputKind::Fofn) => {
                for listed in parse_fofn(path)? {
                    match input_kind(&listed) {
                        Some(InputKind::Fasta) | Some(InputKind::Fastq) => out.push(listed),
                        _ => bail!(
                            "unknown input file extension for file '{}' listed in '{}'",
                            listed.display(),
                            path.display()
                        ),
                    }
                }
            }
            Some(_) => out.push(path.to_path_buf()),
            None => bail!("unknown input file extension for file: '{}'", path.display()),
        }
    }
    Ok(out)
}

fn parse_fofn(path: &Path) -> Result<Vec<PathBuf>> {
    let fh = std::fs::File::open(path).with_context(|| format!("cannot open FOFN '{}'", path.display()))?;
    let mut files = Vec::new();
    for line in std::io::BufReader::new(fh).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        files.push(PathBuf::from(line));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn classify_extensions() {
        assert_eq!(input_kind(Path::new("a/reads.FASTA")), Some(InputKind::Fasta));
        assert_eq!(input_kind(Path::new("ref.fa")), Some(InputKind::Fasta));
        assert_eq!(input_kind(Path::new("r.fq")), Some(InputKind::Fastq));
        assert_eq!(input_kind(Path::new("list.fofn")), Some(InputKind::Fofn));
        assert_eq!(input_kind(Path::new("reads.bam")), None);
        assert_eq!(input_kind(Path::new("reads.fastq.gz")), Some(InputKind::Fastq));
        assert_eq!(input_kind(Path::new("ref.FA.GZ")), Some(InputKind::Fasta));
        assert_eq!(input_kind(Path::new("list.fofn.gz")), None);
        assert_eq!(input_kind(Path::new("reads.gz")), None);
        assert!(is_gzipped(Path::new("a/ref.fa.gz")));
        assert!(!is_gzipped(Path::new("a/ref.fa")));
    }

    #[test]
    fn expands_fofn() {
        let dir = tempfile::tempdir().unwrap();
        let fofn = dir.path().join("inputs.fofn");
        let mut f = std::fs::File::create(&fofn).unwrap();
        writeln!(f, "/data/a.fasta\n\n# comment\n/data/b.fastq").unwrap();
        drop(f);

        let files = expand_inputs(&[fofn.as_path(), Path::new("c.fa")]).unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("/data/a.fasta"), PathBuf::from("/data/b.fastq"), PathBuf::from("c.fa")]
        );
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = expand_inputs(&["reads.txt"]).unwrap_err();
        assert!(err.to_string().contains("reads.txt"));
    }
}
