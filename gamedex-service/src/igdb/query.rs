//! Apicalypse query construction.
//!
//! IGDB takes its query language in the POST body as plain text, e.g.
//! `search "zelda"; fields id, name; limit 5;`. The builder keeps clause
//! ordering consistent (search, fields, where, limit) and escapes search
//! terms so user input cannot break out of the quoted string.

/// Builder for Apicalypse query strings
#[derive(Debug, Default, Clone)]
pub struct Query {
    search: Option<String>,
    fields: Vec<&'static str>,
    where_clause: Option<String>,
    limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full-text search clause. The term is escaped before interpolation.
    pub fn search(mut self, term: &str) -> Self {
        self.search = Some(escape_term(term));
        self
    }

    /// Fields to return
    pub fn fields(mut self, fields: &[&'static str]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    /// Filter on a scalar field, e.g. `where id = 5`
    pub fn where_eq(mut self, field: &'static str, id: u64) -> Self {
        self.where_clause = Some(format!("{} = {}", field, id));
        self
    }

    /// Filter on membership in a reference array, e.g. `where games = (1234)`
    pub fn where_member(mut self, field: &'static str, id: u64) -> Self {
        self.where_clause = Some(format!("{} = ({})", field, id));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render the query body
    pub fn build(&self) -> String {
        let mut clauses = Vec::new();

        if let Some(term) = &self.search {
            clauses.push(format!("search \"{}\";", term));
        }
        if !self.fields.is_empty() {
            clauses.push(format!("fields {};", self.fields.join(", ")));
        }
        if let Some(clause) = &self.where_clause {
            clauses.push(format!("where {};", clause));
        }
        if let Some(limit) = self.limit {
            clauses.push(format!("limit {};", limit));
        }

        clauses.join(" ")
    }
}

/// Escape backslashes and double quotes in a search term
fn escape_term(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_search_query() {
        let query = Query::new()
            .search("Cyberpunk 2077")
            .fields(&["id", "name", "summary", "url"])
            .limit(1)
            .build();
        assert_eq!(
            query,
            "search \"Cyberpunk 2077\"; fields id, name, summary, url; limit 1;"
        );
    }

    #[test]
    fn test_lookup_query() {
        let query = Query::new()
            .fields(&["name"])
            .where_eq("id", 2)
            .limit(1)
            .build();
        assert_eq!(query, "fields name; where id = 2; limit 1;");
    }

    #[test]
    fn test_characters_for_game_query() {
        let query = Query::new()
            .fields(&["name", "description", "gender", "species", "url"])
            .where_member("games", 1877)
            .limit(500)
            .build();
        assert_eq!(
            query,
            "fields name, description, gender, species, url; where games = (1877); limit 500;"
        );
    }

    #[test]
    fn test_search_term_escaping() {
        let query = Query::new().search("say \"hello\"; fields *").build();
        assert_eq!(query, "search \"say \\\"hello\\\"; fields *\";");

        let query = Query::new().search("back\\slash").build();
        assert_eq!(query, "search \"back\\\\slash\";");
    }
}
