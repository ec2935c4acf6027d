use futures::{Stream, stream};
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

/// A candidate address and the line it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// Line number in the source (1-indexed, blank lines included)
    pub number: usize,
    /// The line content, without its line ending
    pub address: String,
}

impl SourceLine {
    pub fn new(number: usize, address: impl Into<String>) -> Self {
        Self {
            number,
            address: address.into(),
        }
    }
}

/// Read every non-empty line of `reader`.
pub async fn read_addresses<R>(reader: R) -> io::Result<Vec<SourceLine>>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut addresses = Vec::new();
    let mut number = 0;

    while let Some(line) = lines.next_line().await? {
        number += 1;
        if let Some(address) = candidate(&line) {
            addresses.push(SourceLine::new(number, address));
        }
    }

    Ok(addresses)
}

/// Lazily yield the non-empty lines of `reader`.
///
/// The stream ends after the first read error, which is yielded as its
/// last item.
pub fn address_lines<R>(reader: R) -> impl Stream<Item = io::Result<SourceLine>> + Send
where
    R: AsyncRead + Unpin + Send,
{
    let state: Option<(Lines<BufReader<R>>, usize)> = Some((BufReader::new(reader).lines(), 0));

    stream::unfold(state, |state| async move {
        let (mut lines, mut number) = state?;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    number += 1;
                    if let Some(address) = candidate(&line) {
                        return Some((Ok(SourceLine::new(number, address)), Some((lines, number))));
                    }
                }
                Ok(None) => return None,
                Err(err) => return Some((Err(err), None)),
            }
        }
    })
}

/// Empty lines are absent; anything else, padding included, goes to the validator.
fn candidate(line: &str) -> Option<&str> {
    (!line.is_empty()).then_some(line)
}
