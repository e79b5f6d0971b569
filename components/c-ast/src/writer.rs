use std::io;
use std::io::Write;
use std::str;

const TAB_WIDTH: usize = 2;

/// Indenting text writer.
///
/// Output methods never fail; the first I/O error is kept and handed
/// back by [`Writer::finish`], after which output is discarded.
pub struct Writer<F: Write> {
    out: F,
    error: Option<io::Error>,
    spaces: Vec<usize>,
    line_started: bool,
}

impl<F: Write> Writer<F> {
    pub fn new(out: F) -> Writer<F> {
        Writer {
            out,
            error: None,
            spaces: vec![0],
            line_started: false,
        }
    }

    fn spaces(&self) -> usize {
        self.spaces.last().cloned().unwrap_or(0)
    }

    pub fn push_tab(&mut self) {
        let spaces = self.spaces() - (self.spaces() % TAB_WIDTH) + TAB_WIDTH;
        self.spaces.push(spaces);
    }

    pub fn pop_tab(&mut self) {
        if self.spaces.len() > 1 {
            self.spaces.pop();
        }
    }

    pub fn new_line(&mut self) {
        self.write("\n");
    }

    pub fn new_lines(&mut self, lines: u32) {
        for _ in 0..lines {
            self.new_line();
        }
    }

    pub fn open_brace(&mut self) {
        self.write(" {");
        self.push_tab();
        self.new_line();
    }

    pub fn close_brace(&mut self) {
        self.pop_tab();
        self.write("}");
    }

    pub fn write(&mut self, text: &'static str) {
        write!(self, "{}", text);
    }

    pub fn write_fmt(&mut self, fmt: ::std::fmt::Arguments) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = FmtWriter(self).write_fmt(fmt) {
            self.error = Some(e);
        }
    }

    /// Flush the output, returning the first error seen while writing.
    pub fn finish(mut self) -> io::Result<F> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

struct FmtWriter<'a, F: 'a + Write>(&'a mut Writer<F>);

impl<'a, F: Write> Write for FmtWriter<'a, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let writer = &mut self.0;

        let text =
            str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut first_line = true;

        for line in text.split('\n') {
            if !first_line {
                writeln!(writer.out)?;
                writer.line_started = false;
            }

            if !writer.line_started && !line.is_empty() {
                for _ in 0..writer.spaces() {
                    write!(writer.out, " ")?;
                }
                writer.line_started = true;
            }
            write!(writer.out, "{}", line)?;
            first_line = false;
        }

        Ok(text.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_nested_braces() {
        let mut writer = Writer::new(Vec::new());
        write!(writer, "struct a");
        writer.open_brace();
        write!(writer, "int x;\nint y;");
        writer.new_line();
        writer.close_brace();
        writer.new_line();

        writer.pop_tab();
        let out = writer.finish().unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "struct a {\n  int x;\n  int y;\n}\n"
        );
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn keeps_first_error() {
        let mut writer = Writer::new(Broken);
        writer.write("a");
        writer.new_line();
        let err = writer.finish().err().unwrap();
        assert_eq!(err.to_string(), "disk on fire");
    }
}
