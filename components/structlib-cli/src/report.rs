use std::io::Write;

use anyhow::Result;

use ffi::{Crate, Layout, Path, ReturnPath, Target};

fn return_path_name(path: ReturnPath) -> &'static str {
    match path {
        ReturnPath::Registers => "registers",
        ReturnPath::Memory => "memory",
    }
}

/// Print the reference C layout of every item on `target`.
pub fn layouts<W: Write>(lib: &Crate, target: Target, out: &mut W) -> Result<()> {
    writeln!(out, "target {} (long is {} bytes)", target, target.long_size())?;
    for index in 0..lib.items.len() {
        let path = Path::new(index);
        let layout = target.layout_of(lib, path)?;
        writeln!(
            out,
            "{}: size {}, align {}, returned in {}",
            layout.name,
            layout.size,
            layout.align,
            return_path_name(target.return_path(lib, path)?)
        )?;
        for field in &layout.fields {
            writeln!(out, "  {:<8} offset {:>2}, size {}", field.name, field.offset, field.size)?;
        }
    }
    Ok(())
}

/// Compare `compiled` layouts, in item order, with the reference layouts
/// on `target`. Returns the number of mismatching items.
pub fn check<W: Write>(
    lib: &Crate,
    compiled: &[Layout],
    target: Target,
    out: &mut W,
) -> Result<usize> {
    let mut mismatches = 0;
    for (index, item) in lib.items.iter().enumerate() {
        let reference = target.layout_of(lib, Path::new(index))?;
        match compiled.iter().find(|x| x.name == item.name) {
            Some(layout) if *layout == reference => {
                writeln!(out, "ok       {} ({} bytes)", item.name, layout.size)?;
            }
            Some(layout) => {
                warn!("`{}` compiled as {:?}, expected {:?}", item.name, layout, reference);
                writeln!(
                    out,
                    "mismatch {} (compiled {} bytes, C {} bytes)",
                    item.name, layout.size, reference.size
                )?;
                mismatches += 1;
            }
            None => {
                writeln!(out, "missing  {}", item.name)?;
                mismatches += 1;
            }
        }
    }
    Ok(mismatches)
}

/// Call every exported function and print the fields it returned.
pub fn probe<W: Write>(out: &mut W) -> Result<()> {
    let tiny = structlib::return_tiny();
    writeln!(out, "returnTiny  -> {{ b1: {:?} }}", tiny.b1 as u8 as char)?;

    let small = structlib::return_small();
    writeln!(out, "returnSmall -> {{ one: {}, two: {} }}", small.one, small.two)?;

    let big = structlib::return_big();
    writeln!(
        out,
        "returnBig   -> {{ one: {}, two: {}, three: {} }}",
        big.one, big.two, big.three
    )?;

    let huge = structlib::return_huge();
    writeln!(
        out,
        "returnHuge  -> {{ one: {}, two: {}, three: {}, four: {}, five: {}, six: {} }}",
        huge.one, huge.two, huge.three, huge.four, huge.five, huge.six
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F: FnOnce(&mut Vec<u8>) -> Result<()>>(f: F) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn layout_table() {
        let lib = structlib::describe();
        let text = render(|out| layouts(&lib, Target::X86_64SysV, out));

        assert!(text.starts_with("target x86_64-sysv (long is 8 bytes)\n"));
        assert!(text.contains("small: size 16, align 8, returned in registers\n"));
        assert!(text.contains("huge: size 48, align 8, returned in memory\n"));
        assert!(text.contains("  six      offset 40, size 8\n"));
    }

    #[test]
    fn check_reports_mismatches() {
        let lib = structlib::describe();
        let mut compiled = Vec::new();
        for index in 0..lib.items.len() {
            compiled.push(Target::X86_64SysV.layout_of(&lib, Path::new(index)).unwrap());
        }
        compiled[2].size += 8;
        compiled.remove(3);

        let mut out = Vec::new();
        let mismatches = check(&lib, &compiled, Target::X86_64SysV, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(mismatches, 2);
        assert!(text.contains("ok       tiny (1 bytes)\n"));
        assert!(text.contains("mismatch big (compiled 32 bytes, C 24 bytes)\n"));
        assert!(text.contains("missing  huge\n"));
    }

    #[test]
    fn check_passes_on_host() {
        let target = match Target::host() {
            Some(target) => target,
            None => return,
        };
        let lib = structlib::describe();
        let mut out = Vec::new();
        let mismatches = check(&lib, &structlib::compiled_layouts(), target, &mut out).unwrap();
        assert_eq!(mismatches, 0);
    }

    #[test]
    fn probe_prints_literals() {
        let text = render(|out| probe(out));
        assert_eq!(
            text,
            "returnTiny  -> { b1: 'z' }\n\
             returnSmall -> { one: 111, two: 222 }\n\
             returnBig   -> { one: 111, two: 222, three: 3.14159 }\n\
             returnHuge  -> { one: 111, two: 222, three: 3.5, four: 444, five: 555, six: 6.789 }\n"
        );
    }
}
