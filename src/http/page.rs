//! Page render for the presentation layer.
//!
//! The page only carries what the browser script needs for its next search:
//! the current token and the remaining quota. Styling and behaviour live in
//! the external presentation script.

use serde::Serialize;

/// Data handed to a client at page load.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionInfo {
    /// Token to echo in the next search.
    pub token: String,
    /// Searches left in the current minute.
    pub remaining: u32,
    /// Searches allowed per minute.
    pub limit: u32,
    /// Seconds until the token rotates.
    pub expires_in: u64,
}

/// Render the search page.
pub fn render(info: &SessionInfo) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Lookup</title>
</head>
<body>
    <main>
        <form id="searchForm" method="post" action="/">
            <input type="hidden" name="action" value="osint_search">
            <input type="hidden" name="token" value="{token}">
            <select name="type" id="searchType">
                <option value="email">Email</option>
                <option value="phone">Phone</option>
                <option value="username">Username</option>
                <option value="domain">Domain</option>
            </select>
            <input type="text" name="query" id="searchInput" required>
            <button type="submit" id="searchBtn">Search</button>
        </form>
        <p class="rate-limit-display">Searches remaining: {remaining}</p>
        <div id="resultsContent"></div>
    </main>
    <script>
        window.searchToken = '{token}';
        window.rateLimitRemaining = {remaining};
    </script>
</body>
</html>
"#,
        token = info.token,
        remaining = info.remaining,
    )
}
