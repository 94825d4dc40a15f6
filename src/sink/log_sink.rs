use std::sync::Arc;

/// Destination for invocation log records
///
/// A record is a printf-style template containing `%s` placeholders plus
/// the ordered values that fill them. Implementations format and write
/// synchronously and are responsible for their own thread-safety.
pub trait Sink: Send + Sync {
    fn log(&self, template: &str, values: &[&str]);
}

/// Any matching closure is a sink
impl<F> Sink for F
where
    F: Fn(&str, &[&str]) + Send + Sync,
{
    fn log(&self, template: &str, values: &[&str]) {
        self(template, values)
    }
}

/// Whether two handles point at the same sink
///
/// Only the data pointer is compared, so the same sink reached through
/// different trait object vtables still counts as one.
pub fn same_sink(a: &Arc<dyn Sink>, b: &Arc<dyn Sink>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Substitute `%s` placeholders in order
///
/// Placeholders without a value render empty; surplus values are ignored.
/// `%%` is a literal percent sign.
pub fn format_template(template: &str, values: &[&str]) -> String {
    let capacity = template.len() + values.iter().map(|v| v.len()).sum::<usize>();
    let mut output = String::with_capacity(capacity);
    let mut remaining = values.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            output.push(c);
            continue;
        }
        match chars.peek() {
            Some('s') => {
                chars.next();
                if let Some(value) = remaining.next() {
                    output.push_str(value);
                }
            }
            Some('%') => {
                chars.next();
                output.push('%');
            }
            _ => output.push('%'),
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_format_call_template() {
        assert_eq!(format_template("%s(%s)", &["T.method3", "24, 42"]), "T.method3(24, 42)");
    }

    #[test]
    fn test_format_fault_template() {
        let message = format_template(
            "%s: raised %s (\"%s\")",
            &["T.method4", "RuntimeError", "exception"],
        );
        assert_eq!(message, "T.method4: raised RuntimeError (\"exception\")");
    }

    #[test]
    fn test_format_missing_and_surplus_values() {
        assert_eq!(format_template("%s and %s", &["one"]), "one and ");
        assert_eq!(format_template("%s", &["one", "two"]), "one");
    }

    #[test]
    fn test_format_literal_percent() {
        assert_eq!(format_template("100%% of %s", &["calls"]), "100% of calls");
        assert_eq!(format_template("50% done", &[]), "50% done");
    }

    #[test]
    fn test_closure_as_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let sink = move |template: &str, values: &[&str]| {
            captured.lock().unwrap().push(format_template(template, values));
        };

        sink.log("%s: %s", &["T.method1", "None"]);

        assert_eq!(*seen.lock().unwrap(), vec!["T.method1: None"]);
    }

    #[test]
    fn test_same_sink_compares_identity() {
        let sink: Arc<dyn Sink> = Arc::new(crate::sink::RecordingSink::default());
        let other: Arc<dyn Sink> = Arc::new(crate::sink::RecordingSink::default());

        assert!(same_sink(&sink, &sink.clone()));
        assert!(!same_sink(&sink, &other));
    }
}
