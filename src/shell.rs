//! Line-oriented shell for inspecting and editing a knowledge base.
//!
//! The shell reads commands from any [`BufRead`] and writes replies to any
//! [`Write`], so it runs the same against a terminal and against test
//! buffers. It owns at most one [`Database`] and drops it on exit.
//!
//! Commands taking resource arguments accept names (first match in insertion
//! order) or 1-based positions written `#3`. `newres` and `newfact` without
//! arguments fall back to interactive prompts.

use std::io::{self, BufRead, Write};

use crate::exec::Inspector;
use crate::ontology::{Database, Resource, ResourceId};

const HELP: &str = "Available commands:
createdb                     Create new database
newres [name]                Add new resource
newfact [pred [args...]]     Add new fact
listres                      List all resources
listfacts                    List all facts
find <name>                  Show the handle of a resource
check <pred> [args...]       Test whether a fact is stored
query <rel> <subj|?> <obj|?> Complete a binary relation
export                       Print the database as JSON
help                         Show this text
quit, exit, q                Quit";

const NO_DATABASE: &str = "Error: no database available";

/// Whether the shell should keep reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<R, W> {
    input: R,
    out: W,
    db: Option<Database>,
    /// Print the banner and `> ` prompts.
    interactive: bool,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            input,
            out,
            db: None,
            interactive: true,
        }
    }

    /// Suppress the banner and prompts, for scripted input.
    pub fn quiet(mut self) -> Self {
        self.interactive = false;
        self
    }

    pub fn with_database(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    pub fn database(&self) -> Option<&Database> {
        self.db.as_ref()
    }

    /// The database (if any) and the output sink.
    pub fn into_parts(self) -> (Option<Database>, W) {
        (self.db, self.out)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn prompt(&mut self, text: &str) -> io::Result<()> {
        if self.interactive {
            write!(self.out, "{text}")?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Read and evaluate commands until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        if self.interactive {
            writeln!(self.out, "ontc interactive shell")?;
            writeln!(self.out, "Enter \"help\" for a list of available commands.")?;
        }
        loop {
            self.prompt("> ")?;
            let Some(line) = self.read_line()? else {
                break;
            };
            if self.evaluate(&line)? == Flow::Exit {
                break;
            }
        }
        self.out.flush()
    }

    /// Evaluate one command line.
    pub fn evaluate(&mut self, line: &str) -> io::Result<Flow> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Flow::Continue);
        };
        let args: Vec<&str> = words.collect();
        tracing::debug!(command, args = args.len(), "shell command");

        match command {
            "quit" | "exit" | "q" => return Ok(Flow::Exit),
            "help" => writeln!(self.out, "{HELP}")?,
            "createdb" => self.create_db()?,
            "newres" => self.new_resource(&args)?,
            "newfact" => self.new_fact(&args)?,
            "listres" => self.list_resources()?,
            "listfacts" => self.list_facts()?,
            "find" => self.find(&args)?,
            "check" => self.check(&args)?,
            "query" => self.query(&args)?,
            "export" => self.export()?,
            _ => writeln!(self.out, "Unknown command")?,
        }
        Ok(Flow::Continue)
    }

    fn create_db(&mut self) -> io::Result<()> {
        if self.db.is_some() {
            return writeln!(self.out, "Database exists already!");
        }
        self.db = Some(Database::new());
        writeln!(self.out, "Database created")
    }

    fn new_resource(&mut self, args: &[&str]) -> io::Result<()> {
        if self.db.is_none() {
            return writeln!(self.out, "{NO_DATABASE}");
        }
        let name = match args {
            [] => {
                self.prompt("Name: ")?;
                self.read_line()?.unwrap_or_default().trim().to_string()
            }
            _ => args.join(" "),
        };
        if let Some(db) = self.db.as_mut() {
            db.add_resource(Resource::new(name));
        }
        writeln!(self.out, "Resource created!")
    }

    fn new_fact(&mut self, args: &[&str]) -> io::Result<()> {
        let Some(db) = self.db.as_ref() else {
            return writeln!(self.out, "{NO_DATABASE}");
        };

        let ids = if args.is_empty() {
            match self.select_interactively()? {
                Some(ids) => ids,
                None => return writeln!(self.out, "Error while creating fact"),
            }
        } else {
            match resolve_all(db, args) {
                Ok(ids) => ids,
                Err(token) => return writeln!(self.out, "Error: unknown resource `{token}`"),
            }
        };

        let Some(db) = self.db.as_mut() else {
            return writeln!(self.out, "{NO_DATABASE}");
        };
        let Some((&predicate, arguments)) = ids.split_first() else {
            return writeln!(self.out, "Error while creating fact");
        };
        let stored = db
            .build_fact(predicate, arguments)
            .and_then(|fact| db.add_fact(fact));
        match stored {
            Ok(()) => writeln!(self.out, "Fact created!"),
            Err(err) => writeln!(self.out, "Error: {err}"),
        }
    }

    /// Predicate, then arguments until an empty line.
    fn select_interactively(&mut self) -> io::Result<Option<Vec<ResourceId>>> {
        writeln!(self.out, "Select predicate:")?;
        let Some(predicate) = self.select_resource()? else {
            return Ok(None);
        };
        let mut ids = vec![predicate];
        loop {
            writeln!(self.out, "Select argument or press enter to finish:")?;
            match self.select_resource()? {
                Some(id) => ids.push(id),
                None => return Ok(Some(ids)),
            }
        }
    }

    fn select_resource(&mut self) -> io::Result<Option<ResourceId>> {
        let Some(db) = self.db.as_ref() else {
            return Ok(None);
        };
        let listing: Vec<String> = db
            .resources()
            .map(|(id, r)| format!("{} {}", id.index() + 1, r.name()))
            .collect();
        for entry in &listing {
            writeln!(self.out, "{entry}")?;
        }
        self.prompt("Enter element to choose: ")?;
        let line = self.read_line()?.unwrap_or_default();
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let picked = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| self.db.as_ref()?.resources().nth(index).map(|(id, _)| id));
        if picked.is_none() {
            writeln!(self.out, "Error: invalid selection")?;
        }
        Ok(picked)
    }

    fn list_resources(&mut self) -> io::Result<()> {
        let Some(db) = self.db.as_ref() else {
            return writeln!(self.out, "{NO_DATABASE}");
        };
        for (id, resource) in db.resources() {
            writeln!(self.out, "#{} {}", id.index() + 1, resource.name())?;
        }
        Ok(())
    }

    fn list_facts(&mut self) -> io::Result<()> {
        let Some(db) = self.db.as_ref() else {
            return writeln!(self.out, "{NO_DATABASE}");
        };
        for fact in db.facts() {
            writeln!(self.out, "{}", db.render_fact(fact))?;
        }
        Ok(())
    }

    fn find(&mut self, args: &[&str]) -> io::Result<()> {
        let Some(db) = self.db.as_ref() else {
            return writeln!(self.out, "{NO_DATABASE}");
        };
        let name = args.join(" ");
        match db.find_resource(&name) {
            Some(id) => writeln!(self.out, "#{} {name}", id.index() + 1),
            None => writeln!(self.out, "not found"),
        }
    }

    fn check(&mut self, args: &[&str]) -> io::Result<()> {
        let Some(db) = self.db.as_ref() else {
            return writeln!(self.out, "{NO_DATABASE}");
        };
        let ids = match resolve_all(db, args) {
            Ok(ids) => ids,
            Err(token) => return writeln!(self.out, "Error: unknown resource `{token}`"),
        };
        let Some((&predicate, arguments)) = ids.split_first() else {
            return writeln!(self.out, "usage: check <pred> [args...]");
        };
        match db.build_fact(predicate, arguments) {
            Ok(fact) => {
                let answer = if db.check_fact(&fact) { "yes" } else { "no" };
                writeln!(self.out, "{answer}")
            }
            Err(err) => writeln!(self.out, "Error: {err}"),
        }
    }

    fn query(&mut self, args: &[&str]) -> io::Result<()> {
        let Some(db) = self.db.as_ref() else {
            return writeln!(self.out, "{NO_DATABASE}");
        };
        let [relation, subject, object] = args else {
            return writeln!(self.out, "usage: query <rel> <subj|?> <obj|?>");
        };
        let anchor = |token: &str| -> Result<Option<ResourceId>, String> {
            if token == "?" {
                Ok(None)
            } else {
                resolve(db, token).map(Some).ok_or_else(|| token.to_string())
            }
        };
        let resolved = resolve(db, relation)
            .ok_or_else(|| relation.to_string())
            .and_then(|rel| Ok((rel, anchor(*subject)?, anchor(*object)?)));
        let (rel, subject, object) = match resolved {
            Ok(parts) => parts,
            Err(token) => return writeln!(self.out, "Error: unknown resource `{token}`"),
        };
        let names: Result<Vec<&str>, _> = db
            .query_triple(rel, subject, object)
            .map(|matches| matches.filter_map(|id| db.name_of(id)).collect());
        match names {
            Ok(names) if names.is_empty() => writeln!(self.out, "(none)"),
            Ok(names) => writeln!(self.out, "{}", names.join("\n")),
            Err(err) => writeln!(self.out, "Error: {err}"),
        }
    }

    fn export(&mut self) -> io::Result<()> {
        let Some(db) = self.db.as_ref() else {
            return writeln!(self.out, "{NO_DATABASE}");
        };
        let json = serde_json::to_string_pretty(&db.export()).map_err(io::Error::other)?;
        writeln!(self.out, "{json}")
    }
}

/// Resolve `#n` (1-based position) or a resource name.
fn resolve(db: &Database, token: &str) -> Option<ResourceId> {
    match token.strip_prefix('#') {
        Some(position) => {
            let index = position.parse::<usize>().ok()?.checked_sub(1)?;
            db.resources().nth(index).map(|(id, _)| id)
        }
        None => db.find_resource(token),
    }
}

fn resolve_all<'t>(db: &Database, tokens: &[&'t str]) -> Result<Vec<ResourceId>, &'t str> {
    tokens
        .iter()
        .map(|&token| resolve(db, token).ok_or(token))
        .collect()
}

impl<R: BufRead, W: Write> Inspector for Shell<R, W> {
    fn inspect(&mut self, database: Database) -> io::Result<()> {
        self.db = Some(database);
        self.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(script: &str) -> String {
        session_with(None, script).0
    }

    fn session_with(db: Option<Database>, script: &str) -> (String, Option<Database>) {
        let mut shell = Shell::new(script.as_bytes(), Vec::new()).quiet();
        if let Some(db) = db {
            shell = shell.with_database(db);
        }
        shell.run().unwrap();
        let Shell { out, db, .. } = shell;
        (String::from_utf8(out).unwrap(), db)
    }

    #[test]
    fn commands_need_a_database() {
        let out = session("listres\nnewres x\nlistfacts\n");
        assert_eq!(out.lines().collect::<Vec<_>>(), vec![NO_DATABASE; 3]);
    }

    #[test]
    fn createdb_only_once() {
        let out = session("createdb\ncreatedb\n");
        assert_eq!(out, "Database created\nDatabase exists already!\n");
    }

    #[test]
    fn resources_and_facts() {
        let out = session(
            "createdb\nnewres subclassOf\nnewres car\nnewres vehicle\n\
             newfact subclassOf car vehicle\nlistres\nlistfacts\n",
        );
        assert!(out.contains("Resource created!"));
        assert!(out.contains("Fact created!"));
        assert!(out.contains("#2 car"));
        assert!(out.ends_with("subclassOf(car, vehicle).\n"));
    }

    #[test]
    fn interactive_newfact_selects_by_number() {
        let out = session("createdb\nnewres likes\nnewres bob\nnewfact\n1\n2\n\nlistfacts\n");
        assert!(out.contains("Select predicate:"));
        assert!(out.contains("Fact created!"));
        assert!(out.ends_with("likes(bob).\n"));
    }

    #[test]
    fn interactive_newres_reads_name() {
        let (_, db) = session_with(None, "createdb\nnewres\nfirst resource\n");
        let db = db.unwrap();
        assert!(db.find_resource("first resource").is_some());
    }

    #[test]
    fn check_and_query() {
        let out = session(
            "createdb\nnewres subclassOf\nnewres car\nnewres vehicle\nnewres bike\n\
             newfact subclassOf car vehicle\nnewfact subclassOf bike vehicle\n\
             check subclassOf car vehicle\ncheck subclassOf vehicle car\n\
             query subclassOf ? vehicle\nquery subclassOf car car\nquery subclassOf vehicle ?\n",
        );
        let tail: Vec<&str> = out.lines().skip(7).collect();
        assert_eq!(
            tail,
            vec![
                "yes",
                "no",
                "car",
                "bike",
                "Error: no query goal: both subject and object are fixed",
                "(none)",
            ]
        );
    }

    #[test]
    fn unknown_names_are_reported() {
        let out = session("createdb\nnewfact ghost\ncheck ghost\n");
        assert!(out.contains("Error: unknown resource `ghost`"));
    }

    #[test]
    fn positions_address_duplicate_names() {
        let out = session("createdb\nnewres p\nnewres x\nnewres x\nnewfact p #3\ncheck p #2\ncheck p #3\n");
        assert!(out.ends_with("no\nyes\n"));
    }

    #[test]
    fn quit_stops_reading() {
        let out = session("createdb\nq\nlistres\n");
        assert_eq!(out, "Database created\n");
    }

    #[test]
    fn unknown_command() {
        assert_eq!(session("frobnicate\n"), "Unknown command\n");
    }

    #[test]
    fn export_prints_json() {
        let mut db = Database::new();
        db.add_resource(Resource::new("alpha"));
        let (out, _) = session_with(Some(db), "export\n");
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["resources"][0]["name"], "alpha");
    }

    #[test]
    fn inspector_takes_ownership() {
        let mut shell = Shell::new("listres\n".as_bytes(), Vec::new()).quiet();
        let mut db = Database::new();
        db.add_resource(Resource::new("main"));
        shell.inspect(db).unwrap();
        assert_eq!(shell.database().map(Database::resource_count), Some(1));
        let Shell { out, .. } = shell;
        assert_eq!(String::from_utf8(out).unwrap(), "#1 main\n");
    }
}
