use json_log_line::{ExceptionInfo, JsonFormatter, Level, Record, TimeFormat};

fn main() {
    let formatter = JsonFormatter::verbose().with_time_format(TimeFormat::Passthrough);

    let err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "payment gateway hung up");
    let record = Record::new(Level::Error, "Payment failed")
        .with_target("billing")
        .with_module_path(module_path!())
        .with_source(file!(), line!())
        .with_exception(ExceptionInfo::from_error(&err));

    println!("{}", formatter.format(&record).unwrap());
}
