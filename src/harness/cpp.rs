use super::kind::{OutputShape, ProblemKind, GENERIC_PLACEHOLDER};

const PREAMBLE: &str = r#"#include <iostream>
#include <vector>
#include <string>
#include <sstream>
#include <algorithm>
#include <unordered_map>
#include <stdexcept>
using namespace std;

"#;

const LIST_NODE: &str = r#"struct ListNode {
    int val;
    ListNode *next;
    ListNode() : val(0), next(nullptr) {}
    ListNode(int x) : val(x), next(nullptr) {}
    ListNode(int x, ListNode *next) : val(x), next(next) {}
};

"#;

const ARRAY_HELPERS: &str = r#"static string trimLine(const string& s) {
    size_t start = s.find_first_not_of(" \t\r\n");
    if (start == string::npos) return "";
    size_t end = s.find_last_not_of(" \t\r\n");
    return s.substr(start, end - start + 1);
}

static vector<int> parseIntArray(string line) {
    line = trimLine(line);
    if (!line.empty() && line.front() == '[' && line.back() == ']') {
        line = line.substr(1, line.length() - 2);
    }

    vector<int> result;
    if (trimLine(line).empty()) return result;

    stringstream ss(line);
    string num;
    while (getline(ss, num, ',')) {
        result.push_back(stoi(num));
    }
    return result;
}

static void printIntArray(const vector<int>& arr) {
    cout << "[";
    for (size_t i = 0; i < arr.size(); i++) {
        if (i > 0) cout << ",";
        cout << arr[i];
    }
    cout << "]" << endl;
}

"#;

const LIST_HELPERS: &str = r#"static ListNode* parseLinkedList(const string& line) {
    vector<int> values = parseIntArray(line);
    if (values.empty()) return nullptr;

    ListNode* head = new ListNode(values[0]);
    ListNode* current = head;
    for (size_t i = 1; i < values.size(); i++) {
        current->next = new ListNode(values[i]);
        current = current->next;
    }
    return head;
}

static void printLinkedList(ListNode* head) {
    cout << "[";
    bool first = true;
    for (ListNode* current = head; current; current = current->next) {
        if (!first) cout << ",";
        cout << current->val;
        first = false;
    }
    cout << "]" << endl;
}

"#;

pub fn wrap(source: &str, kind: ProblemKind) -> String {
    let descriptor = kind.descriptor();
    let mut program = String::from(PREAMBLE);

    if kind.uses_linked_list() {
        program.push_str(LIST_NODE);
    }

    program.push_str(source);
    program.push_str("\n\n");

    program.push_str(ARRAY_HELPERS);
    if kind.uses_linked_list() {
        program.push_str(LIST_HELPERS);
    }

    program.push_str("int main() {\n");
    program.push_str("    try {\n");
    program.push_str("        Solution solution;\n");
    program.push_str("        string line;\n");
    program.push_str("        getline(cin, line);\n");
    program.push_str("        line = trimLine(line);\n");

    match descriptor.output {
        OutputShape::IntArray => {
            program.push_str("        vector<int> nums = parseIntArray(line);\n");
            program.push_str("        int target = 0;\n");
            program.push_str("        if (getline(cin, line) && !trimLine(line).empty()) {\n");
            program.push_str("            target = stoi(trimLine(line));\n");
            program.push_str("        }\n");
            program.push_str(&format!(
                "        vector<int> result = solution.{}(nums, target);\n",
                descriptor.entry_method
            ));
            program.push_str("        printIntArray(result);\n");
        }
        OutputShape::LinkedList => {
            program.push_str("        ListNode* head = parseLinkedList(line);\n");
            program.push_str(&format!(
                "        ListNode* result = solution.{}(head);\n",
                descriptor.entry_method
            ));
            program.push_str("        printLinkedList(result);\n");
        }
        OutputShape::Placeholder => {
            program.push_str("        if (!line.empty() && line.front() == '[') {\n");
            program.push_str("            parseIntArray(line);\n");
            program.push_str("        }\n");
            program.push_str(&format!(
                "        cout << \"{}\" << endl;\n",
                GENERIC_PLACEHOLDER
            ));
        }
    }

    program.push_str("    } catch (const exception& e) {\n");
    program.push_str("        cerr << \"Error: \" << e.what() << endl;\n");
    program.push_str("        return 1;\n");
    program.push_str("    }\n");
    program.push_str("    return 0;\n");
    program.push_str("}\n");
    program
}
