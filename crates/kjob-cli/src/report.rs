use std::{
    collections::BTreeSet,
    io::{self, Write},
};

use kjob_core::{ContainerLogs, ContainerStates};

/// Print one section per container: a header with its final state, then its raw log.
///
/// Containers appear in name order; a container known only from its state gets a header and no
/// body.
pub fn write_report<W: Write>(
    out: &mut W,
    logs: Option<&ContainerLogs>,
    states: Option<&ContainerStates>,
) -> io::Result<()> {
    let names: BTreeSet<&str> = logs
        .into_iter()
        .flat_map(|l| l.keys())
        .chain(states.into_iter().flat_map(|s| s.keys()))
        .map(String::as_str)
        .collect();

    for name in names {
        match states.and_then(|s| s.get(name)) {
            Some(state) => writeln!(out, "==> {name} [{state}] <==")?,
            None => writeln!(out, "==> {name} <==")?,
        }
        if let Some(bytes) = logs.and_then(|l| l.get(name)) {
            out.write_all(bytes)?;
            if !bytes.is_empty() && !bytes.ends_with(b"\n") {
                writeln!(out)?;
            }
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kjob_core::ContainerState;

    fn render(logs: Option<&ContainerLogs>, states: Option<&ContainerStates>) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, logs, states).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn sections_follow_container_names() {
        let mut logs = ContainerLogs::new();
        logs.insert("worker".into(), b"migrated 12 tables\n".to_vec());
        logs.insert("sidecar".into(), b"no newline".to_vec());
        let mut states = ContainerStates::new();
        states.insert("worker".into(), ContainerState::terminated(0));

        assert_eq!(
            render(Some(&logs), Some(&states)),
            "==> sidecar <==\nno newline\n\
             ==> worker [terminated (exit code 0)] <==\nmigrated 12 tables\n"
        );
    }

    #[test]
    fn states_without_logs_still_print_headers() {
        let mut states = ContainerStates::new();
        states.insert(
            "worker".into(),
            ContainerState::Waiting {
                reason: Some("ImagePullBackOff".into()),
                message: None,
            },
        );

        assert_eq!(
            render(None, Some(&states)),
            "==> worker [waiting (ImagePullBackOff)] <==\n"
        );
    }

    #[test]
    fn nothing_collected_prints_nothing() {
        assert_eq!(render(None, None), "");
    }
}
