//! Static HTML pages served next to the stream

/// Login form, served at `/index.html`
pub const INDEX_PAGE: &str = "\
<html>
  <head>
    <title>Live Camera - Login</title>
    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
  </head>
  <body>
    <h1>Please login</h1>
    <form method=\"POST\" enctype=\"multipart/form-data\" action=\"/login\">
      <input type=\"text\" placeholder=\"Username\" name=\"username\" value=\"\">
      <input type=\"password\" placeholder=\"Password\" name=\"password\" value=\"\">
      <input type=\"submit\" value=\"Login\">
    </form>
  </body>
</html>
";

/// Stream viewer page, served at `/stream.html` and after login
pub const STREAM_PAGE: &str = "\
<html>
  <head>
    <title>Live Camera</title>
  </head>
  <body>
    <center><h1>Live Camera</h1></center>
    <center><img src=\"stream.mjpg\" width=\"640\" height=\"480\"></center>
  </body>
</html>
";

/// Shown when a login submission is rejected
pub const LOGIN_RETRY_PAGE: &str = "\
<html>
  <head>
    <title>Incorrect Login</title>
  </head>
  <body>
    <center>Please try again</center>
  </body>
</html>
";
