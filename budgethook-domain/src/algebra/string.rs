pub trait StringExt {
    fn snake_case(&self) -> String;
}

impl StringExt for String {
    fn snake_case(&self) -> String {
        let mut snake_case = String::new();

        for (i, c) in self.chars().enumerate() {
            if c.is_whitespace() || c == '-' {
                if !snake_case.ends_with('_') {
                    snake_case.push('_');
                }
            } else if c.is_ascii_uppercase() && i > 0 && !snake_case.ends_with('_') {
                snake_case.push('_');
                snake_case.push(c.to_ascii_lowercase());
            } else {
                snake_case.push(c.to_ascii_lowercase());
            }
        }

        snake_case
    }
}
