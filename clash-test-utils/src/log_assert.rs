use clash::battle::Field;

/// Asserts that new logs in the field are equal to the given logs.
///
/// Marks every log as read.
#[track_caller]
pub fn assert_new_logs_eq(field: &mut Field, want: &[&str]) {
    let got = field
        .log_mut()
        .read_out()
        .map(|message| message.to_string())
        .collect::<Vec<_>>();
    pretty_assertions::assert_eq!(got, want)
}

/// Asserts that logs since the given turn started are equal to the given logs.
#[track_caller]
pub fn assert_logs_since_turn_eq(field: &Field, turn: u64, want: &[&str]) {
    let got = field.log().logs().collect::<Vec<_>>();
    let turn_log = format!("turn|turn:{turn}");
    let turn_log_index = got
        .iter()
        .position(|log| log == &turn_log)
        .unwrap_or_else(|| panic!("turn {turn} never started"));
    pretty_assertions::assert_eq!(&got[(turn_log_index + 1)..], want)
}
