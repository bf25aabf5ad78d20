//! The single page served at `/`. Choosing a PDF indexes it right away;
//! asking a question re-sends the PDF together with the question.

pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Ask your PDF</title>
<style>
  body {
    margin: 0;
    min-height: 100vh;
    font-family: sans-serif;
    background-color: #e6f0ff;
    background-image: linear-gradient(to bottom right, #e6f0ff, #b3d1ff);
    color: #cc0000;
  }
  main { max-width: 46rem; margin: 0 auto; padding: 3rem 1rem; }
  h1 { color: #b30000; text-shadow: 2px 2px 5px rgba(0,0,0,0.3); }
  label { display: block; color: #b30000; margin: 1.5rem 0 0.5rem; }
  input[type=text] {
    width: 100%;
    box-sizing: border-box;
    padding: 0.6rem;
    border: 1px solid #cc0000;
    border-radius: 6px;
    color: #cc0000;
  }
  #question-block { display: none; }
  #spinner { display: none; margin-top: 1rem; color: #b30000; }
  .notice { margin-top: 1rem; padding: 0.8rem 1rem; border-radius: 6px; }
  .notice.warning { background: #fff8e1; color: #8a6d00; }
  .notice.error { background: #ffe5e5; color: #b30000; }
  #answer {
    display: none;
    margin-top: 1.5rem;
    white-space: pre-wrap;
    color: #ff3333;
    font-family: 'Georgia', serif;
    font-size: 1.1em;
    border: 1px dashed #cc0000;
    padding: 15px;
    border-radius: 10px;
    background-color: #fff0f0;
    box-shadow: 0 4px 8px rgba(0,0,0,0.1);
  }
</style>
</head>
<body>
<main>
  <h1>The Document Genie 🧞</h1>

  <label for="pdf">Upload your PDF</label>
  <input id="pdf" type="file" accept="application/pdf,.pdf">

  <form id="question-block">
    <label for="question">Ask a question about your PDF:</label>
    <input id="question" type="text" autocomplete="off">
  </form>

  <div id="spinner">The Genie is thinking...</div>
  <div id="notice"></div>
  <div id="answer"></div>
</main>
<script>
  const pdfInput = document.getElementById('pdf');
  const questionBlock = document.getElementById('question-block');
  const questionInput = document.getElementById('question');
  const spinner = document.getElementById('spinner');
  const notice = document.getElementById('notice');
  const answer = document.getElementById('answer');

  function showNotice(kind, message) {
    notice.className = 'notice ' + kind;
    notice.textContent = message;
  }

  function clearOutput() {
    notice.className = '';
    notice.textContent = '';
    answer.style.display = 'none';
    answer.textContent = '';
  }

  async function ask(question) {
    const file = pdfInput.files[0];
    if (!file) {
      return;
    }

    const form = new FormData();
    form.append('pdf', file, file.name);
    if (question) {
      form.append('question', question);
    }

    clearOutput();
    if (question) {
      spinner.style.display = 'block';
    }

    try {
      const response = await fetch('/ask', { method: 'POST', body: form });
      const body = await response.json();

      if (body.status === 'warning' || body.status === 'error') {
        questionBlock.style.display = 'none';
        showNotice(body.status, body.error);
        return;
      }

      questionBlock.style.display = 'block';
      if (body.status === 'answered') {
        answer.textContent = body.answer;
        answer.style.display = 'block';
      }
    } catch (err) {
      showNotice('error', 'An error occurred: ' + err);
    } finally {
      spinner.style.display = 'none';
    }
  }

  pdfInput.addEventListener('change', () => {
    questionInput.value = '';
    questionBlock.style.display = 'none';
    ask(null);
  });

  questionBlock.addEventListener('submit', (event) => {
    event.preventDefault();
    const question = questionInput.value;
    if (question.trim()) {
      ask(question);
    }
  });
</script>
</body>
</html>
"##;
